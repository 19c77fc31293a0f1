// A `Step` is one hop: given a `QueryState`, produce the states reachable
// from it in a single `out` call. `repeat` drives a `Step` level by level;
// `Query::out` applies one directly to the whole stream.

use hypergraphdb_base::Result;
use hypergraphdb_store::{CoreStore, QueryState, TransactionCache};
use hypergraphdb_view::{ViewContext, ViewFactory};
use std::rc::Rc;

pub type Step = Box<dyn Fn(&QueryState) -> Vec<Result<QueryState>>>;

pub fn out_step(
    core: Rc<CoreStore>,
    cache: Rc<TransactionCache>,
    factory: Rc<ViewFactory>,
    view_name: String,
    label: Option<String>,
) -> Step {
    Box::new(move |state: &QueryState| {
        let view = factory.lookup(&view_name).unwrap_or_else(|| factory.default_view());
        let ctx = ViewContext::new(&core, &cache, &factory);
        view.out(&ctx, state, label.as_deref())
            .map(|result| result.map(|hop| hop.state))
            .collect()
    })
}
