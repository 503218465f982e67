use crate::config::AppConfig;
use crate::files::FileService;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub files: FileService,
}
