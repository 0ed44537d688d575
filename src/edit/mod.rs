//! Structural edits on a tree whose only durable state is Newick text.
//!
//! A [TreeSession] owns the canonical text together with the collapsed set,
//! the rename map, the [MergeLedger] and the identifier table. Commands
//! address nodes by the [NodeId](crate::model::NodeId) of the current layout
//! pass:
//! * [collapse](TreeSession::collapse) hides a clade from rendering
//! * [rename](TreeSession::rename) labels a collapsed clade; the first label
//!   merges it into a single pseudo-leaf in the text
//! * [expand](TreeSession::expand) restores a merged clade
//! * [threshold_collapse](TreeSession::threshold_collapse) collapses by depth
//! * [move_to_root](TreeSession::move_to_root) re-roots a clade next to the
//!   rest of the tree
//!
//! [NodeMatcher] finds a node again in an independently parsed copy of the
//! tree, where only names, branch lengths and positions carry over.

pub mod command;
pub mod error;
pub mod ledger;
pub mod matcher;
pub mod session;

pub use command::EditCommand;
pub use error::EditError;
pub use ledger::{MergeEntry, MergeLedger};
pub use matcher::NodeMatcher;
pub use session::TreeSession;
