//! Generate FORMULAS.md from the formula registry.
//!
//! ```bash
//! cargo run --bin gen-formulas
//! ```
//!
//! Run from the workspace root; the file is written to
//! `fincalc_core/FORMULAS.md`.

use std::fs;
use std::path::Path;

use fincalc_core::equations::generate_formulas_markdown;

fn main() {
    let markdown = generate_formulas_markdown();
    let output_path = Path::new("fincalc_core/FORMULAS.md");

    match fs::write(output_path, &markdown) {
        Ok(()) => {
            println!("Wrote {} bytes to {}", markdown.len(), output_path.display());
        }
        Err(e) => {
            eprintln!("Error writing {}: {}", output_path.display(), e);
            std::process::exit(1);
        }
    }
}
