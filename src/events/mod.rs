//! # Events Module
//!
//! Progress reporting for batch comparisons.
//!
//! ## Design
//! The core library emits events through channels, allowing any UI
//! (CLI, web handler, job runner) to subscribe and display progress.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Batch(BatchEvent::Progress(p)) = event {
//!             println!("Scored {}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! comparator.compare_with_events(&reference, &candidates, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
