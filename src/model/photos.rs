use serde::{Deserialize, Serialize};

/// `/api/photos` response: server-relative photo paths for the slideshow.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PhotoList {
    #[serde(default)]
    pub photos: Vec<String>,
}
