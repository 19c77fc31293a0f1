// Bundles the collaborators every view call needs, instead of threading
// `core`/`cache`/`factory` through each method individually (spec §4.E: "a
// view factory ... shares a transaction cache across collaborating views in
// the same query").

use hypergraphdb_store::{CoreStore, TransactionCache};

use crate::registry::ViewFactory;

pub struct ViewContext<'a> {
    pub core: &'a CoreStore,
    pub cache: &'a TransactionCache,
    pub factory: &'a ViewFactory,
}

impl<'a> ViewContext<'a> {
    pub fn new(core: &'a CoreStore, cache: &'a TransactionCache, factory: &'a ViewFactory) -> Self {
        ViewContext { core, cache, factory }
    }
}
