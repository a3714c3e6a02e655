use crate::services::AcademyService;

#[derive(Clone)]
pub struct AppState {
    pub academy: AcademyService,
}
