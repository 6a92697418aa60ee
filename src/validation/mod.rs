//! Content checks.
//!
//! Split by the state each check needs: [`pop`] sees one finished tag,
//! [`local`] sees one line and its ancestors, [`global`] sees a whole file,
//! and [`consistency`] runs once over everything collected from the corpus.
//! [`markup`] holds the Pango conversion shared by several passes.

pub mod consistency;
pub mod global;
pub mod local;
pub mod markup;
pub mod pop;

pub use consistency::consistency_check;
pub use global::global_sanity_check;
pub use local::local_sanity_check;
pub use pop::validate_on_pop;
