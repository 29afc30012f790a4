//! Terminal rendering of an analysis result.

use scriptscan_core::ImageCell;
use scriptscan_render::{DetailsView, ResultView, REJECTION_MESSAGE, REJECTION_TITLE};

use crate::terminal_output::{render_table, Column, Style, CYAN, GREEN, RED, YELLOW};

pub fn render_report(view: &ResultView, show_images: bool, style: Style) -> String {
    match view {
        ResultView::Rejected => format!(
            "{} {}\n{}\n",
            style.paint(RED, "✗"),
            style.bold(REJECTION_TITLE),
            REJECTION_MESSAGE
        ),
        ResultView::Details(details) => render_details(details, show_images, style),
    }
}

fn joined(parts: impl IntoIterator<Item = String>) -> String {
    parts.into_iter().collect::<Vec<_>>().join(" · ")
}

fn render_details(details: &DetailsView, show_images: bool, style: Style) -> String {
    let mut out = String::new();

    let doctor = &details.doctor;
    let doctor_line = joined(
        std::iter::once(style.bold(&doctor.name))
            .chain(doctor.specialty.clone())
            .chain(doctor.hospital.clone())
            .chain(doctor.license_number.as_ref().map(|l| format!("Reg: {l}")))
            .chain(doctor.contact.clone()),
    );
    out.push_str(&format!("{}  {doctor_line}\n", style.paint(CYAN, "Doctor ")));

    let patient = &details.patient;
    let patient_line = joined(
        std::iter::once(style.bold(&patient.name))
            .chain(patient.badges.iter().cloned())
            .chain(patient.date.as_ref().map(|d| format!("Date: {d}"))),
    );
    out.push_str(&format!("{}  {patient_line}\n", style.paint(CYAN, "Patient")));

    if let Some(notes) = &details.notes {
        out.push_str(&format!("\n{}\n", style.bold("Clinical Notes")));
        if let Some(diagnosis) = &notes.diagnosis {
            out.push_str(&format!("  Diagnosis: {diagnosis}\n"));
        }
        if let Some(advice) = &notes.general_advice {
            out.push_str(&format!("  Advice: {advice}\n"));
        }
    }

    let list = &details.medications;
    out.push_str(&format!("\n{} ({})\n", style.bold("Medications"), list.count()));
    match list.placeholder() {
        Some(text) => out.push_str(&format!("  {}\n", style.dim(text))),
        None => {
            let columns = vec![
                Column::right("#"),
                Column::left("Medication").max_width(28),
                Column::left("Generic").max_width(24),
                Column::left("Dosage"),
                Column::left("Frequency").max_width(28),
                Column::left("Duration"),
                Column::left("Instructions").max_width(32),
            ];
            let dash = || "-".to_string();
            let rows: Vec<Vec<String>> = list
                .rows
                .iter()
                .map(|row| {
                    let name = match &row.kind {
                        Some(kind) => format!("{} ({kind})", row.name),
                        None => row.name.clone(),
                    };
                    vec![
                        (row.index + 1).to_string(),
                        name,
                        row.generic_name.clone().unwrap_or_else(dash),
                        row.dosage.clone().unwrap_or_else(dash),
                        row.frequency.clone().unwrap_or_else(dash),
                        row.duration.clone().unwrap_or_else(dash),
                        row.instructions.clone().unwrap_or_else(dash),
                    ]
                })
                .collect();
            out.push_str(&render_table(&columns, &rows, style));

            if show_images {
                out.push_str(&format!("\n{}\n", style.bold("Images")));
                for row in &list.rows {
                    let status = match &row.image {
                        ImageCell::Found(url) => format!("{} {url}", style.paint(GREEN, "found")),
                        ImageCell::NotFound => format!(
                            "{} search: {}",
                            style.paint(YELLOW, "not found;"),
                            row.search_url.as_deref().unwrap_or(row.fallback_url())
                        ),
                        ImageCell::Loading => style.dim("pending"),
                    };
                    out.push_str(&format!("  {}. {}: {status}\n", row.index + 1, row.name));
                }
            }
        }
    }

    if let Some(date) = &details.follow_up {
        out.push_str(&format!("\n{} {date}\n", style.bold("Follow-up Date:")));
    }

    out
}
