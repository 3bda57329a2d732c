//! Reading tests - hand-built packages decoded by `WorkbookReader`.

mod container;
mod data_types;
mod dates;
mod formulas;
mod merged_cells;
mod number_formats;
mod shared_strings;
