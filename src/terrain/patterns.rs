//! Static catalogue of maze row patterns and decoration templates
//!
//! Maze rows are written bottom-to-top as tile occupancy strings, one
//! character per column: `#` is a tile, `.` is a gap. Every row must have
//! exactly `MAZE_COLUMNS` characters. Consecutive rows are authored so some
//! run of tiles overlaps (or nearly overlaps) the run below it; the maze
//! spawner still re-validates every row at placement time.

use crate::consts::MAZE_COLUMNS;
use crate::error::GenError;

/// A multi-row structural template
#[derive(Debug, Clone, Copy)]
pub struct MazePattern {
    pub name: &'static str,
    /// Occupancy strings, lowest row first
    pub rows: &'static [&'static str],
    /// Relative selection weight
    pub difficulty_weight: u32,
    /// Lowest difficulty tier the pattern may appear at
    pub min_tier: u32,
    /// Decoration template placed on this pattern's segments
    pub decoration: Option<usize>,
}

/// A contiguous run of tiles in one pattern row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start_col: usize,
    pub len: usize,
}

impl MazePattern {
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Tile runs of one row, optionally mirrored, left to right
    pub fn segments(&self, row: usize, mirrored: bool) -> Vec<Segment> {
        let Some(def) = self.rows.get(row) else {
            return Vec::new();
        };
        let cells: Vec<bool> = if mirrored {
            def.bytes().rev().map(|c| c == b'#').collect()
        } else {
            def.bytes().map(|c| c == b'#').collect()
        };

        let mut segments = Vec::new();
        let mut run_start: Option<usize> = None;
        for (col, &filled) in cells.iter().enumerate() {
            match (filled, run_start) {
                (true, None) => run_start = Some(col),
                (false, Some(start)) => {
                    segments.push(Segment {
                        start_col: start,
                        len: col - start,
                    });
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            segments.push(Segment {
                start_col: start,
                len: cells.len() - start,
            });
        }
        segments
    }

    /// Every row has the library's column count and at least one tile
    pub fn is_well_formed(&self) -> bool {
        !self.rows.is_empty()
            && self
                .rows
                .iter()
                .all(|r| r.len() == MAZE_COLUMNS && r.bytes().all(|c| c == b'#' || c == b'.') && r.contains('#'))
    }
}

/// Named arrangement of cosmetic elements in normalized segment space
#[derive(Debug, Clone, Copy)]
pub struct DecorationPattern {
    pub name: &'static str,
    /// (u, v) in [0,1]x[0,1]: u across the segment, v upward from its surface
    pub placements: &'static [(f32, f32)],
    /// Probability each placement is kept
    pub density: f32,
}

pub static MAZE_PATTERNS: &[MazePattern] = &[
    MazePattern {
        name: "Zigzag",
        rows: &[
            "####........",
            "...####.....",
            "......####..",
            "...####.....",
            "####........",
        ],
        difficulty_weight: 3,
        min_tier: 0,
        decoration: Some(0),
    },
    MazePattern {
        name: "Split Ladder",
        rows: &[
            "###......###",
            "....####....",
            "###......###",
            "....####....",
        ],
        difficulty_weight: 3,
        min_tier: 0,
        decoration: Some(3),
    },
    MazePattern {
        name: "Funnel",
        rows: &[
            "#####..#####",
            "..###..###..",
            "...##..##...",
            "....####....",
        ],
        difficulty_weight: 2,
        min_tier: 1,
        decoration: Some(2),
    },
    MazePattern {
        name: "Stepping Stones",
        rows: &[
            "##...##...##",
            "....##...##.",
            "##...##...##",
            ".##...##....",
        ],
        difficulty_weight: 2,
        min_tier: 2,
        decoration: None,
    },
    MazePattern {
        name: "Spiral",
        rows: &[
            "##########..",
            "..........##",
            "..##########",
            "##..........",
            "##########..",
        ],
        difficulty_weight: 1,
        min_tier: 3,
        decoration: Some(1),
    },
    MazePattern {
        name: "Gauntlet",
        rows: &[
            "#..#..#..#..",
            "..#..#..#..#",
            "#..#..#..#..",
            "..#..#..#..#",
            "#..#..#..#..",
        ],
        difficulty_weight: 1,
        min_tier: 4,
        decoration: None,
    },
];

pub static DECORATION_PATTERNS: &[DecorationPattern] = &[
    DecorationPattern {
        name: "Grass Tufts",
        placements: &[(0.1, 0.0), (0.4, 0.0), (0.8, 0.0)],
        density: 0.8,
    },
    DecorationPattern {
        name: "Crystal Cluster",
        placements: &[(0.3, 0.1), (0.5, 0.3), (0.7, 0.1)],
        density: 0.5,
    },
    DecorationPattern {
        name: "Hanging Vines",
        placements: &[(0.2, 1.0), (0.6, 1.0), (0.9, 1.0)],
        density: 0.4,
    },
    DecorationPattern {
        name: "Lanterns",
        placements: &[(0.5, 0.6)],
        density: 0.3,
    },
];

/// Read-only view over the static catalogues
#[derive(Debug, Clone, Copy)]
pub struct PatternLibrary {
    patterns: &'static [MazePattern],
    decorations: &'static [DecorationPattern],
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self {
            patterns: MAZE_PATTERNS,
            decorations: DECORATION_PATTERNS,
        }
    }
}

impl PatternLibrary {
    pub fn new(
        patterns: &'static [MazePattern],
        decorations: &'static [DecorationPattern],
    ) -> Self {
        Self {
            patterns,
            decorations,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &'static [MazePattern] {
        self.patterns
    }

    pub fn get(&self, index: usize) -> Result<&'static MazePattern, GenError> {
        self.patterns.get(index).ok_or(GenError::PatternNotFound {
            index,
            len: self.patterns.len(),
        })
    }

    pub fn decoration(&self, index: usize) -> Option<&'static DecorationPattern> {
        self.decorations.get(index)
    }

    pub fn decorations(&self) -> &'static [DecorationPattern] {
        self.decorations
    }

    /// Indices of patterns unlocked at the given tier
    pub fn unlocked(&self, tier: u32) -> impl Iterator<Item = usize> + '_ {
        self.patterns
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.min_tier <= tier)
            .map(|(i, _)| i)
    }

    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.patterns.iter().position(|p| p.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_patterns_are_well_formed() {
        for pattern in MAZE_PATTERNS {
            assert!(pattern.is_well_formed(), "{} is malformed", pattern.name);
            if let Some(d) = pattern.decoration {
                assert!(d < DECORATION_PATTERNS.len(), "{} decoration out of range", pattern.name);
            }
        }
    }

    #[test]
    fn test_decorations_are_normalized() {
        for deco in DECORATION_PATTERNS {
            assert!((0.0..=1.0).contains(&deco.density));
            for &(u, v) in deco.placements {
                assert!((0.0..=1.0).contains(&u) && (0.0..=1.0).contains(&v), "{}", deco.name);
            }
        }
    }

    #[test]
    fn test_segments() {
        let pattern = &MAZE_PATTERNS[1]; // Split Ladder
        let segs = pattern.segments(0, false);
        assert_eq!(
            segs,
            vec![
                Segment { start_col: 0, len: 3 },
                Segment { start_col: 9, len: 3 }
            ]
        );
        assert_eq!(pattern.segments(1, false), vec![Segment { start_col: 4, len: 4 }]);
    }

    #[test]
    fn test_mirrored_segments() {
        let pattern = &MAZE_PATTERNS[0]; // Zigzag
        assert_eq!(pattern.segments(0, true), vec![Segment { start_col: 8, len: 4 }]);
        assert!(pattern.segments(99, false).is_empty());
    }

    #[test]
    fn test_lookup_out_of_range() {
        let lib = PatternLibrary::default();
        let err = lib.get(lib.len()).unwrap_err();
        assert_eq!(err, GenError::PatternNotFound { index: lib.len(), len: lib.len() });
    }

    #[test]
    fn test_unlocked_grows_with_tier() {
        let lib = PatternLibrary::default();
        let low = lib.unlocked(0).count();
        let high = lib.unlocked(10).count();
        assert!(low >= 1);
        assert_eq!(high, lib.len());
        assert!(low < high);
    }

    #[test]
    fn test_find_by_name() {
        let lib = PatternLibrary::default();
        assert_eq!(lib.find_by_name("funnel"), Some(2));
        assert_eq!(lib.find_by_name("nope"), None);
    }
}
