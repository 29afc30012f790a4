//! HTML fragments for a [`ResultView`].
//!
//! Every piece of extracted text is escaped; the record comes from a model
//! reading an arbitrary photo.

use pulldown_cmark::escape::escape_html;

use scriptscan_core::ImageCell;

use crate::view::{
    DetailsView, DoctorPanel, MedicationList, MedicationRow, NotesPanel, PatientPanel, REJECTION_MESSAGE,
    REJECTION_TITLE, ResultView,
};

pub(crate) fn esc(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, text);
    out
}

pub fn render_result(view: &ResultView) -> String {
    match view {
        ResultView::Rejected => render_rejection(),
        ResultView::Details(details) => render_details(details),
    }
}

fn render_rejection() -> String {
    format!(
        "<section class=\"panel rejection\">\n<h3>{}</h3>\n<p>{}</p>\n</section>\n",
        esc(REJECTION_TITLE),
        esc(REJECTION_MESSAGE)
    )
}

fn render_details(details: &DetailsView) -> String {
    let mut out = String::from("<section class=\"result\">\n<div class=\"identity\">\n");
    out.push_str(&render_doctor(&details.doctor));
    out.push_str(&render_patient(&details.patient));
    out.push_str("</div>\n");
    if let Some(notes) = &details.notes {
        out.push_str(&render_notes(notes));
    }
    out.push_str(&render_medications(&details.medications));
    if let Some(date) = &details.follow_up {
        out.push_str(&format!(
            "<div class=\"panel follow-up\"><span>Follow-up Date</span> <strong>{}</strong></div>\n",
            esc(date)
        ));
    }
    out.push_str("</section>\n");
    out
}

fn optional_line(class: &str, label: &str, value: &Option<String>) -> String {
    match value {
        Some(v) => format!("<p class=\"{class}\">{label}{}</p>\n", esc(v)),
        None => String::new(),
    }
}

fn render_doctor(doctor: &DoctorPanel) -> String {
    let mut out = String::from("<div class=\"panel doctor\">\n<h4>Doctor</h4>\n");
    out.push_str(&format!("<p class=\"name\">{}</p>\n", esc(&doctor.name)));
    out.push_str(&optional_line("specialty", "", &doctor.specialty));
    out.push_str(&optional_line("hospital", "", &doctor.hospital));
    out.push_str(&optional_line("license", "Reg: ", &doctor.license_number));
    out.push_str(&optional_line("contact", "", &doctor.contact));
    out.push_str("</div>\n");
    out
}

fn render_patient(patient: &PatientPanel) -> String {
    let mut out = String::from("<div class=\"panel patient\">\n<h4>Patient</h4>\n");
    out.push_str(&format!("<p class=\"name\">{}</p>\n", esc(&patient.name)));
    if !patient.badges.is_empty() {
        out.push_str("<p class=\"badges\">");
        for badge in &patient.badges {
            out.push_str(&format!("<span class=\"badge\">{}</span>", esc(badge)));
        }
        out.push_str("</p>\n");
    }
    out.push_str(&optional_line("date", "Date: ", &patient.date));
    out.push_str("</div>\n");
    out
}

fn render_notes(notes: &NotesPanel) -> String {
    let mut out = String::from("<div class=\"panel notes\">\n<h4>Clinical Notes</h4>\n");
    out.push_str(&optional_line("diagnosis", "Diagnosis: ", &notes.diagnosis));
    out.push_str(&optional_line("advice", "Advice: ", &notes.general_advice));
    out.push_str("</div>\n");
    out
}

fn render_medications(list: &MedicationList) -> String {
    let mut out = format!(
        "<div class=\"panel medications\">\n<h4>Medications <span class=\"count\">{}</span></h4>\n",
        list.count()
    );
    match list.placeholder() {
        Some(text) => out.push_str(&format!("<p class=\"empty\">{}</p>\n", esc(text))),
        None => {
            out.push_str("<ul>\n");
            for row in &list.rows {
                out.push_str(&render_row(row));
            }
            out.push_str("</ul>\n");
        }
    }
    out.push_str("</div>\n");
    out
}

fn render_row(row: &MedicationRow) -> String {
    let mut out = format!("<li class=\"medication\" data-index=\"{}\">\n", row.index);
    out.push_str(&render_image_cell(row));

    out.push_str("<div class=\"med-main\">\n");
    out.push_str(&format!("<h5>{}</h5>", esc(&row.name)));
    if let Some(kind) = &row.kind {
        out.push_str(&format!(" <span class=\"badge kind\">{}</span>", esc(kind)));
    }
    out.push('\n');
    out.push_str(&optional_line("generic", "", &row.generic_name));
    out.push_str(&optional_line("dosage", "Dosage: ", &row.dosage));
    out.push_str(&optional_line("duration", "Duration: ", &row.duration));
    out.push_str("</div>\n");

    out.push_str("<div class=\"med-schedule\">\n");
    out.push_str(&optional_line("frequency", "", &row.frequency));
    if let Some(instructions) = &row.instructions {
        out.push_str(&format!("<p class=\"instructions\">\"{}\"</p>\n", esc(instructions)));
    }
    out.push_str("</div>\n</li>\n");
    out
}

/// The image slot for one row. The polling script replaces its contents in place.
pub fn render_image_cell(row: &MedicationRow) -> String {
    let (status, inner) = match &row.image {
        ImageCell::Loading => ("loading", "<span class=\"spinner\">Loading image...</span>".to_string()),
        ImageCell::Found(url) => (
            "found",
            format!("<img src=\"{}\" alt=\"{}\" loading=\"lazy\">", esc(url), esc(&row.name)),
        ),
        ImageCell::NotFound => {
            let link = row.search_url.as_deref().unwrap_or_else(|| row.fallback_url());
            (
                "notFound",
                format!(
                    "<span class=\"no-image\">No image found</span> \
<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Search images</a>",
                    esc(link)
                ),
            )
        }
    };
    format!(
        "<div class=\"med-image\" id=\"med-image-{}\" data-status=\"{status}\" data-search-url=\"{}\">{inner}</div>\n",
        row.index,
        esc(row.fallback_url())
    )
}
