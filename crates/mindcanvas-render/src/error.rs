pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid viewport {width}x{height} at pixel ratio {pixel_ratio}")]
    InvalidViewport {
        width: f64,
        height: f64,
        pixel_ratio: f64,
    },
}
