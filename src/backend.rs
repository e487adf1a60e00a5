#[cfg(feature = "ndarray")]
pub type MainBackend = burn::backend::NdArray<f32, i32>;
#[cfg(all(feature = "wgpu", not(feature = "ndarray")))]
pub type MainBackend = burn::backend::wgpu::Wgpu<f32, i32>;

#[cfg(not(feature = "_has-backend"))]
std::compile_error!("No backend selected. Enable either the `ndarray` or the `wgpu` feature.");

/// Training runs on the autodiff decorator of the selected backend.
pub type MainAutoBackend = burn::backend::Autodiff<MainBackend>;
