//! Render sink contract.

/// Output surface for one visualization.
///
/// Implementations must not call back into the controller that owns them.
pub trait RenderSink<P> {
    /// Draw the payload, replacing whatever the sink showed before.
    fn generate_graph(&mut self, payload: &P);

    /// Clear the drawn representation.
    fn remove_graph(&mut self);
}

impl<P, S: RenderSink<P> + ?Sized> RenderSink<P> for Box<S> {
    fn generate_graph(&mut self, payload: &P) {
        (**self).generate_graph(payload)
    }

    fn remove_graph(&mut self) {
        (**self).remove_graph()
    }
}

/// Sink built from a pair of closures.
pub struct FnSink<G, R> {
    generate: G,
    remove: R,
}

/// Build a [`RenderSink`] from `generate` / `remove` closures.
pub fn fn_sink<P, G, R>(generate: G, remove: R) -> FnSink<G, R>
where
    G: FnMut(&P),
    R: FnMut(),
{
    FnSink { generate, remove }
}

impl<P, G, R> RenderSink<P> for FnSink<G, R>
where
    G: FnMut(&P),
    R: FnMut(),
{
    fn generate_graph(&mut self, payload: &P) {
        (self.generate)(payload)
    }

    fn remove_graph(&mut self) {
        (self.remove)()
    }
}
