use crate::assets::AssetList;
use crate::controls::ControlPanel;
use crate::preferences::Persister;
use crate::video::VideoElement;

/// Everything the page managers act on.
///
/// Built once at startup and owned by the page for its whole lifetime.
pub struct PageContext<V> {
    pub assets: AssetList,
    pub video: V,
    pub controls: ControlPanel,
    pub persister: Persister,
}

impl<V: VideoElement> PageContext<V> {
    pub fn new(assets: AssetList, video: V, persister: Persister) -> Self {
        Self {
            assets,
            video,
            controls: ControlPanel::new(),
            persister,
        }
    }
}
