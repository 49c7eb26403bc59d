//! `libloading` binding to the native engine's C interface.
//!
//! The library is loaded dynamically and leaked, so every resolved symbol is
//! `'static` and the binding can live in a process-wide cell. Callbacks cross
//! the FFI boundary through three `extern "C"` trampolines that recover the
//! Rust handler from the engine's user-data pointer.

use std::ffi::{c_int, c_void};

use libloading::{Library, Symbol};

use super::api::{EngineApi, Param, ProblemSpec};
use super::callbacks::EvalHandler;
use crate::error::SolveError;

/// Which callback slot a registration call fills.
const CALLBACK_OBJECTIVE: c_int = 0;
const CALLBACK_GRADIENT: c_int = 1;
const CALLBACK_HESSIAN: c_int = 2;

/// Signature shared by all three evaluation callbacks.
type EvalCallback = unsafe extern "C" fn(
    request: c_int,
    n: c_int,
    x: *const f64,
    out: *mut f64,
    out_len: c_int,
    user: *mut c_void,
) -> c_int;

type NewFn = unsafe extern "C" fn() -> *mut c_void;
type FreeFn = unsafe extern "C" fn(ctx: *mut c_void);
type SetIntParamFn = unsafe extern "C" fn(ctx: *mut c_void, param: c_int, value: c_int) -> c_int;
type SetCallbackFn = unsafe extern "C" fn(
    ctx: *mut c_void,
    kind: c_int,
    callback: EvalCallback,
    user: *mut c_void,
) -> c_int;
type InitProblemFn = unsafe extern "C" fn(
    ctx: *mut c_void,
    n: c_int,
    goal: c_int,
    objective_type: c_int,
    lower: *const f64,
    upper: *const f64,
    num_hess: c_int,
    hess_rows: *const c_int,
    hess_cols: *const c_int,
    x_init: *const f64,
) -> c_int;
type SolveFn = unsafe extern "C" fn(ctx: *mut c_void, x: *mut f64) -> c_int;
type NumItersFn = unsafe extern "C" fn(ctx: *const c_void) -> c_int;

/// The loaded native engine library with its symbols resolved.
pub(crate) struct NativeEngine {
    new: Symbol<'static, NewFn>,
    free: Symbol<'static, FreeFn>,
    set_int_param: Symbol<'static, SetIntParamFn>,
    set_callback: Symbol<'static, SetCallbackFn>,
    init_problem: Symbol<'static, InitProblemFn>,
    solve: Symbol<'static, SolveFn>,
    num_iters: Symbol<'static, NumItersFn>,
}

// The engine context is only ever used from the thread that created it, but
// the binding itself is shared state behind a OnceLock.
unsafe impl Send for NativeEngine {}
unsafe impl Sync for NativeEngine {}

impl NativeEngine {
    /// Loads the library at `path` and resolves every required symbol.
    ///
    /// The library is intentionally leaked: the binding lives for the rest of
    /// the process, matching the load-once availability model.
    ///
    /// # Errors
    ///
    /// Returns the loader's error if the library cannot be opened or any
    /// symbol is missing.
    pub(crate) fn load(path: &std::ffi::OsStr) -> Result<Self, libloading::Error> {
        // Safety: the engine library has no initialization routines with
        // side effects beyond its own internal state.
        let library: &'static Library = Box::leak(Box::new(unsafe { Library::new(path) }?));
        unsafe {
            Ok(Self {
                new: library.get(b"nlp_new")?,
                free: library.get(b"nlp_free")?,
                set_int_param: library.get(b"nlp_set_int_param")?,
                set_callback: library.get(b"nlp_set_callback")?,
                init_problem: library.get(b"nlp_init_problem")?,
                solve: library.get(b"nlp_solve")?,
                num_iters: library.get(b"nlp_num_iters")?,
            })
        }
    }
}

/// A live native solver context.
pub(crate) struct NativeContext {
    raw: *mut c_void,
}

/// User-data payload handed to the engine for the duration of one solve.
struct HandlerShim<'a> {
    handler: &'a mut dyn EvalHandler,
}

/// Recovers the shim and the engine-owned buffers behind the raw pointers.
///
/// Safety: `user` must be the `HandlerShim` registered for this solve, and
/// `x`/`out` must be valid for `n`/`out_len` elements; the engine guarantees
/// both for the lifetime of the callback invocation.
unsafe fn with_shim<'a>(
    user: *mut c_void,
    x: *const f64,
    n: c_int,
    out: *mut f64,
    out_len: c_int,
) -> (&'a mut HandlerShim<'a>, &'a [f64], &'a mut [f64]) {
    unsafe {
        let shim = &mut *user.cast::<HandlerShim<'_>>();
        let x = std::slice::from_raw_parts(x, n as usize);
        let out = std::slice::from_raw_parts_mut(out, out_len as usize);
        (shim, x, out)
    }
}

unsafe extern "C" fn objective_trampoline(
    request: c_int,
    n: c_int,
    x: *const f64,
    out: *mut f64,
    out_len: c_int,
    user: *mut c_void,
) -> c_int {
    let (shim, x, out) = unsafe { with_shim(user, x, n, out, out_len) };
    match out.first_mut() {
        Some(value) => shim.handler.objective(request, x, value).code(),
        None => super::request::CALLBACK_ERROR,
    }
}

unsafe extern "C" fn gradient_trampoline(
    request: c_int,
    n: c_int,
    x: *const f64,
    out: *mut f64,
    out_len: c_int,
    user: *mut c_void,
) -> c_int {
    let (shim, x, out) = unsafe { with_shim(user, x, n, out, out_len) };
    shim.handler.gradient(request, x, out).code()
}

unsafe extern "C" fn hessian_trampoline(
    request: c_int,
    n: c_int,
    x: *const f64,
    out: *mut f64,
    out_len: c_int,
    user: *mut c_void,
) -> c_int {
    let (shim, x, out) = unsafe { with_shim(user, x, n, out, out_len) };
    shim.handler.hessian(request, x, out).code()
}

impl EngineApi for NativeEngine {
    type Context = NativeContext;

    fn new_context(&self) -> Option<NativeContext> {
        let raw = unsafe { (self.new)() };
        if raw.is_null() {
            None
        } else {
            Some(NativeContext { raw })
        }
    }

    fn set_param(&self, ctx: &mut NativeContext, param: Param, value: i32) -> i32 {
        unsafe { (self.set_int_param)(ctx.raw, param.native_id(), value) }
    }

    fn init_problem(&self, ctx: &mut NativeContext, spec: &ProblemSpec<'_>) -> i32 {
        debug_assert_eq!(spec.hess_rows.len(), spec.hess_cols.len());
        unsafe {
            (self.init_problem)(
                ctx.raw,
                spec.x_init.len() as c_int,
                spec.goal.native_id(),
                spec.objective_type.native_id(),
                spec.lower.as_ptr(),
                spec.upper.as_ptr(),
                spec.hess_rows.len() as c_int,
                spec.hess_rows.as_ptr(),
                spec.hess_cols.as_ptr(),
                spec.x_init.as_ptr(),
            )
        }
    }

    fn solve(
        &self,
        ctx: &mut NativeContext,
        x: &mut [f64],
        handler: &mut dyn EvalHandler,
    ) -> Result<i32, SolveError> {
        let mut shim = HandlerShim { handler };
        let user = std::ptr::from_mut(&mut shim).cast::<c_void>();

        let registrations: [(c_int, EvalCallback, &'static str); 3] = [
            (CALLBACK_OBJECTIVE, objective_trampoline, "objective callback"),
            (CALLBACK_GRADIENT, gradient_trampoline, "gradient callback"),
            (CALLBACK_HESSIAN, hessian_trampoline, "Hessian callback"),
        ];
        for (kind, trampoline, what) in registrations {
            let code = unsafe { (self.set_callback)(ctx.raw, kind, trampoline, user) };
            if code != 0 {
                return Err(SolveError::EngineSetup { what, code });
            }
        }

        // The shim must outlive the solve call; the engine stops invoking
        // callbacks once nlp_solve returns.
        Ok(unsafe { (self.solve)(ctx.raw, x.as_mut_ptr()) })
    }

    fn iterations(&self, ctx: &NativeContext) -> usize {
        let iters = unsafe { (self.num_iters)(ctx.raw) };
        usize::try_from(iters).unwrap_or(0)
    }

    fn release(&self, ctx: &mut NativeContext) {
        unsafe { (self.free)(ctx.raw) };
        ctx.raw = std::ptr::null_mut();
    }
}
