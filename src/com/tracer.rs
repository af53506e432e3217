#![allow(non_snake_case)]

use std::fmt::Display;

////////////////////////////////////////////////////////////////////////////////////////////////////
cfg_if::cfg_if! {
    if #[cfg(feature = "trace_coef")] {
        pub(crate) fn TRACE_COEF_CTX<T: Display>(name: &str, pos: T, ctx: u32) {
            log::trace!(target: "rvcm::coef", "{} {} ctx {}", name, pos, ctx);
        }
    } else {
        #[inline(always)]
        pub(crate) fn TRACE_COEF_CTX<T: Display>(_name: &str, _pos: T, _ctx: u32) {}
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "trace_cu")] {
        pub(crate) fn TRACE_CU_CTX<T: Display>(name: &str, pos: T, ctx: u32) {
            log::trace!(target: "rvcm::cu", "{} @{} ctx {}", name, pos, ctx);
        }
    } else {
        #[inline(always)]
        pub(crate) fn TRACE_CU_CTX<T: Display>(_name: &str, _pos: T, _ctx: u32) {}
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "trace_merge")] {
        pub(crate) fn TRACE_MERGE<T: Display>(name: &str, idx: usize, info: T) {
            log::trace!(target: "rvcm::merge", "{} idx {} -> {}", name, idx, info);
        }
    } else {
        #[inline(always)]
        pub(crate) fn TRACE_MERGE<T: Display>(_name: &str, _idx: usize, _info: T) {}
    }
}
