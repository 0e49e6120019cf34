use core_engine::EngineError;
use core_host::{HostError, SurfaceId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("surface {0} is not available")]
    SurfaceUnavailable(SurfaceId),
    #[error("modal engine is not available")]
    EngineUnavailable,
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Host(#[from] HostError),
}
