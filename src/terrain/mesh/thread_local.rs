// ============================================
// Thread-Local Context - Контексты для потоков
// ============================================
//
// Каждый рабочий поток Rayon получает свой MeshingContext.

use std::cell::RefCell;

use super::context::MeshingContext;

thread_local! {
    static MESHING_CONTEXT: RefCell<MeshingContext> = RefCell::new(MeshingContext::new());
}

/// Выполняет функцию с thread-local контекстом
#[inline]
pub fn with_meshing_context<F, R>(f: F) -> R
where
    F: FnOnce(&mut MeshingContext) -> R,
{
    MESHING_CONTEXT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        f(&mut ctx)
    })
}
