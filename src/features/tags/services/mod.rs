mod tag_reconciler;

pub use tag_reconciler::{reconcile_tags, TagSource};
