// View factory (spec §4.E: "a view factory maps names to constructors and
// shares a transaction cache across collaborating views in the same
// query"). The cache-sharing half of that is [`ViewContext`]; this is the
// name-to-constructor half.

use std::collections::BTreeMap;

use crate::traversal::View;
use crate::views::{GraphView, StaticView};

pub struct ViewFactory {
    views: BTreeMap<String, Box<dyn View>>,
}

impl ViewFactory {
    /// A factory with only `graph` and `static` registered.
    pub fn with_builtins() -> Self {
        let mut factory = ViewFactory { views: BTreeMap::new() };
        factory.register(GraphView);
        factory.register(StaticView);
        factory
    }

    pub fn register(&mut self, view: impl View + 'static) {
        self.views.insert(view.view_name().to_string(), Box::new(view));
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn View> {
        self.views.get(name).map(|v| v.as_ref())
    }

    pub fn default_view(&self) -> &dyn View {
        self.lookup("graph").expect("graph view is always registered")
    }
}

impl Default for ViewFactory {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtins_are_registered_by_name() {
        let factory = ViewFactory::with_builtins();
        assert_eq!(factory.lookup("graph").map(View::view_name), Some("graph"));
        assert_eq!(factory.lookup("static").map(View::view_name), Some("static"));
        assert!(factory.lookup("nonexistent").is_none());
    }
}
