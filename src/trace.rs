//! Solver instrumentation, compiled away without the `tracing` feature.
//!
//! Each instrumented phase of the solver gets a typed guard carrying the
//! fields that matter for that phase: the iteration index, scan
//! direction and scheduling mode for refinement passes, worker and tile
//! counts for the wavefront drain. Without the feature every guard is a
//! zero-sized no-op and the calls vanish from the hot path.

/// Span guard covering one `initialize()` call.
pub(crate) struct InitSpan {
    #[cfg(feature = "tracing")]
    _span: tracing::span::EnteredSpan,
}

/// Opens the initialization span.
pub(crate) fn init_span() -> InitSpan {
    InitSpan {
        #[cfg(feature = "tracing")]
        _span: tracing::info_span!("nnf_initialize").entered(),
    }
}

/// Records the superpatch grid built during initialization.
pub(crate) fn field_initialized(tiles: usize) {
    #[cfg(feature = "tracing")]
    tracing::info!(tiles, "field initialized");
    #[cfg(not(feature = "tracing"))]
    let _ = tiles;
}

/// Span guard covering one refinement iteration.
pub(crate) struct IterationSpan {
    #[cfg(feature = "tracing")]
    _span: tracing::span::EnteredSpan,
}

/// Opens an iteration span with its index, scan direction and mode.
pub(crate) fn iteration_span(iteration: u32, reverse: bool, parallel: bool) -> IterationSpan {
    #[cfg(not(feature = "tracing"))]
    let _ = (iteration, reverse, parallel);
    IterationSpan {
        #[cfg(feature = "tracing")]
        _span: tracing::info_span!("nnf_iteration", iteration, reverse, parallel).entered(),
    }
}

/// Span guard covering the parallel wavefront drain of one iteration.
#[cfg(feature = "rayon")]
pub(crate) struct WavefrontSpan {
    #[cfg(feature = "tracing")]
    _span: tracing::span::EnteredSpan,
}

/// Opens the wavefront span with the worker and tile counts.
#[cfg(feature = "rayon")]
pub(crate) fn wavefront_span(workers: usize, tiles: usize) -> WavefrontSpan {
    #[cfg(not(feature = "tracing"))]
    let _ = (workers, tiles);
    WavefrontSpan {
        #[cfg(feature = "tracing")]
        _span: tracing::info_span!("nnf_wavefront", workers, tiles).entered(),
    }
}
