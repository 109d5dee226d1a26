//! tlbridge command-line entry point.
//!
//! ## Usage
//! ```bash
//! tlbridge to-xml cases.csv
//! tlbridge to-csv export.xml -o cases.csv
//! tlbridge verify cases.csv
//! ```

fn main() {
    tlbridge::cli::run();
}
