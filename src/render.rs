use crate::grid::Grid;
use crate::solver::Solution;

/// Turn a solved grid into a rendered string: blocked cells as `█`, open
/// cells covered by a slot as the assigned letter, open cells belonging to
/// no slot as a space. One line per row.
pub fn render(grid: &Grid, solution: &Solution) -> String {
    let mut letters: Vec<Option<char>> = vec![None; grid.height() * grid.width()];

    for (slot, word) in solution.iter() {
        for (k, ch) in word.chars().enumerate() {
            let (row, col) = slot.cell(k);
            letters[row * grid.width() + col] = Some(ch);
        }
    }

    let mut out = String::with_capacity((grid.width() + 1) * grid.height());
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            if grid.is_open(row, col) {
                out.push(letters[row * grid.width() + col].unwrap_or(' '));
            } else {
                out.push('█');
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::grid::Grid;
    use crate::solver::Solver;
    use crate::words::Wordlist;

    #[test]
    fn render_cross_fixture() {
        let grid = Grid::parse("___\n#_#\n#_#").unwrap();
        let words = Wordlist::load("ABC\nBBB");
        let mut solver = Solver::new(&grid, &words);
        let solution = solver.solve().expect("fixture is satisfiable");

        assert_eq!(render(&grid, &solution), "ABC\n█B█\n█B█\n");
    }

    #[test]
    fn open_cell_outside_any_slot_stays_blank() {
        let grid = Grid::parse("_#\n##").unwrap();
        let words = Wordlist::load("ABC");
        let mut solver = Solver::new(&grid, &words);
        let solution = solver.solve().expect("no slots to fill");

        assert_eq!(render(&grid, &solution), " █\n██\n");
    }
}
