//! File I/O operations for life-force grids

use super::grid::{CellState, Grid};
use crate::config::BoundaryCondition;
use crate::utils::ColorOutput;
use anyhow::{Context, Result};
use std::path::Path;

/// Cells are written as one base-36 digit each: `0` is dead, `1`-`9` and
/// `a`-`z` are life-force 1 to 35.
const CELL_RADIX: u32 = 36;

/// Load a grid from a text file, one row per line
pub fn load_grid_from_file<P: AsRef<Path>>(
    path: P,
    boundary_condition: BoundaryCondition
) -> Result<Grid> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read grid file: {}", path.as_ref().display()))?;

    parse_grid_from_string(&content, boundary_condition)
        .with_context(|| format!("Failed to parse grid from file: {}", path.as_ref().display()))
}

/// Parse a grid from its text representation. Blank lines are ignored.
pub fn parse_grid_from_string(content: &str, boundary_condition: BoundaryCondition) -> Result<Grid> {
    let lines: Vec<&str> = content.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        anyhow::bail!("Grid file is empty or contains no valid rows");
    }

    let width = lines[0].chars().count();
    let mut rows = Vec::with_capacity(lines.len());

    for (y, line) in lines.iter().enumerate() {
        let row = line.chars()
            .enumerate()
            .map(|(x, ch)| {
                ch.to_digit(CELL_RADIX)
                    .map(|state| state as CellState)
                    .with_context(|| format!(
                        "Invalid character '{}' at ({}, {}). Only 0-9 and a-z are allowed", ch, x, y
                    ))
            })
            .collect::<Result<Vec<_>>>()?;

        if row.len() != width {
            anyhow::bail!("Row {} has length {}, expected {} (all rows must have the same length)",
                         y, row.len(), width);
        }
        rows.push(row);
    }

    Grid::from_rows(rows, boundary_condition)
}

/// Save a grid to a text file, creating parent directories as needed
pub fn save_grid_to_file<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    let content = grid_to_string(grid)?;

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write grid to file: {}", path.as_ref().display()))?;

    Ok(())
}

/// Convert a grid to its text representation
pub fn grid_to_string(grid: &Grid) -> Result<String> {
    let mut result = String::with_capacity(grid.height * (grid.width + 1));

    for y in 0..grid.height {
        for x in 0..grid.width {
            let state = grid.get(x, y);
            let symbol = char::from_digit(state as u32, CELL_RADIX)
                .with_context(|| format!("Life-force {} at ({}, {}) exceeds 35", state, x, y))?;
            result.push(symbol);
        }
        result.push('\n');
    }

    Ok(result)
}

/// Load every `.txt` grid in a directory, sorted by file name. Files that fail
/// to parse are reported and skipped.
pub fn load_grids_from_directory<P: AsRef<Path>>(
    dir_path: P,
    boundary_condition: BoundaryCondition
) -> Result<Vec<(String, Grid)>> {
    let dir = std::fs::read_dir(&dir_path)
        .with_context(|| format!("Failed to read directory: {}", dir_path.as_ref().display()))?;

    let mut grids = Vec::new();

    for entry in dir {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if !path.is_file() || path.extension().map_or(true, |ext| ext != "txt") {
            continue;
        }

        let name = path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();

        match load_grid_from_file(&path, boundary_condition.clone()) {
            Ok(grid) => grids.push((name, grid)),
            Err(e) => {
                let message = format!("Warning: Failed to load {}: {:#}", path.display(), e);
                eprintln!("{}", ColorOutput::warning(&message));
            }
        }
    }

    grids.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(grids)
}

/// Write a set of starting patterns for both binary and weighted rules
pub fn create_example_grids<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let patterns = [
        // binary rules
        ("glider.txt", "00100\n10100\n01100\n00000\n00000\n"),
        ("blinker.txt", "00000\n00000\n01110\n00000\n00000\n"),
        ("block.txt", "0000\n0110\n0110\n0000\n"),
        // weighted rules: fertile parents around an empty centre
        ("nursery.txt", "00000\n04040\n00000\n00400\n00000\n"),
        ("fading_cross.txt", "00000\n00600\n06660\n00600\n00000\n"),
        ("mixed_colony.txt", "0000000\n0123210\n0234320\n0345430\n0234320\n0123210\n0000000\n"),
    ];

    for (name, content) in patterns {
        std::fs::write(dir.join(name), content)
            .with_context(|| format!("Failed to write {}", name))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_grid_from_string() {
        let content = "010\n206\n0a0\n";
        let grid = parse_grid_from_string(content, BoundaryCondition::Dead).unwrap();

        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 3);
        assert_eq!(grid.living_count(), 4);
        assert_eq!(grid.get(1, 0), 1);
        assert_eq!(grid.get(0, 1), 2);
        assert_eq!(grid.get(2, 1), 6);
        assert_eq!(grid.get(1, 2), 10);
    }

    #[test]
    fn test_uppercase_digits_are_accepted() {
        let grid = parse_grid_from_string("0Z\n00\n", BoundaryCondition::Dead).unwrap();
        assert_eq!(grid.get(1, 0), 35);
    }

    #[test]
    fn test_grid_to_string() {
        let rows = vec![
            vec![0, 1, 0],
            vec![6, 0, 12],
        ];
        let grid = Grid::from_rows(rows, BoundaryCondition::Dead).unwrap();
        assert_eq!(grid_to_string(&grid).unwrap(), "010\n60c\n");
    }

    #[test]
    fn test_unrepresentable_life_force() {
        let mut grid = Grid::square(2);
        grid.set(0, 0, 36).unwrap();
        assert!(grid_to_string(&grid).is_err());
    }

    #[test]
    fn test_file_operations() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("nested/test_grid.txt");

        let rows = vec![
            vec![4, 0, 1],
            vec![0, 6, 0],
        ];
        let original_grid = Grid::from_rows(rows, BoundaryCondition::Wrap).unwrap();

        save_grid_to_file(&original_grid, &file_path).unwrap();
        let loaded_grid = load_grid_from_file(&file_path, BoundaryCondition::Wrap).unwrap();

        assert_eq!(original_grid, loaded_grid);
    }

    #[test]
    fn test_invalid_input() {
        assert!(parse_grid_from_string("010\n1-1\n010\n", BoundaryCondition::Dead).is_err());
        assert!(parse_grid_from_string("010\n11\n010\n", BoundaryCondition::Dead).is_err());
        assert!(parse_grid_from_string("", BoundaryCondition::Dead).is_err());
        assert!(parse_grid_from_string("\n  \n", BoundaryCondition::Dead).is_err());
    }

    #[test]
    fn test_load_grids_from_directory_skips_bad_files() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), "11\n11\n").unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "010\n").unwrap();
        std::fs::write(temp_dir.path().join("broken.txt"), "0?0\n").unwrap();
        std::fs::write(temp_dir.path().join("notes.md"), "not a grid").unwrap();

        let grids = load_grids_from_directory(temp_dir.path(), BoundaryCondition::Dead).unwrap();
        let names: Vec<_> = grids.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_create_example_grids() {
        let temp_dir = tempdir().unwrap();
        create_example_grids(temp_dir.path()).unwrap();

        for name in ["glider", "blinker", "block", "nursery", "fading_cross", "mixed_colony"] {
            assert!(temp_dir.path().join(format!("{}.txt", name)).exists());
        }

        let glider = load_grid_from_file(
            temp_dir.path().join("glider.txt"),
            BoundaryCondition::Dead
        ).unwrap();
        assert_eq!(glider.width, 5);
        assert_eq!(glider.height, 5);
        assert_eq!(glider.living_count(), 5);

        let colony = load_grid_from_file(
            temp_dir.path().join("mixed_colony.txt"),
            BoundaryCondition::Dead
        ).unwrap();
        assert_eq!(colony.max_state(), 5);
    }
}
