cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        compile_error!("wasm targets must drive pacing through `progress_time_with` using the embedding's own frame clock; the native wall clock backend is not available.");
    } else {
        mod native;
        pub use native::WallClock;
    }
}
