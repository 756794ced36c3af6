//! # wardrobe-sim CLI
//!
//! Command-line interface for garment image similarity.
//!
//! ## Usage
//! ```bash
//! wardrobe-sim compare shirt.jpg a=candidate1.png b=candidate2.webp
//! wardrobe-sim request body.json --output json
//! ```

mod cli;

use wardrobe_similarity::Result;

fn main() -> Result<()> {
    wardrobe_similarity::init_tracing();
    cli::run()
}
