//! Result presentation: a view model derived from a prescription record, and
//! the HTML page that paints it.

pub mod html;
pub mod page;
pub mod view;

pub use html::{render_image_cell, render_result};
pub use page::{PageModel, render_page};
pub use view::{
    DetailsView, DoctorPanel, MedicationList, MedicationRow, NO_MEDICATIONS_PLACEHOLDER, NotesPanel,
    PatientPanel, REJECTION_MESSAGE, REJECTION_TITLE, ResultView,
};
