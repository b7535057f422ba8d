use super::{non_blank, FormInput, ValidationErrors};
use crate::models::{AppointmentStatus, NewAppointment};

/// Schedule-appointment form
#[derive(Debug, Clone, Default)]
pub struct AppointmentForm {
    pub client_id: String,
    /// "2026-03-01 14:30" or RFC 3339
    pub date_time: String,
    pub kind: String,
    pub notes: String,
}

impl FormInput for AppointmentForm {
    type Output = NewAppointment;

    fn validate(&self) -> Result<NewAppointment, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let client_id = errors.required("client", &self.client_id);
        let date_time = errors.date_time("date", &self.date_time);
        let kind = errors.required("type", &self.kind);

        match date_time {
            Some(date_time) => errors.finish(|| NewAppointment {
                client_id,
                nutritionist_id: None,
                date_time,
                kind,
                status: AppointmentStatus::Scheduled,
                notes: non_blank(&self.notes),
            }),
            None => Err(errors),
        }
    }
}
