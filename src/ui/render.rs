use ratatui::{
    layout::Alignment,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};
use std::time::Duration;

use super::preview::PreviewImage;
use crate::core::decision::Decision;

/// Rows below the preview: spacer, question, buttons, status
const FOOTER_ROWS: u16 = 4;
const MIN_PROMPT_WIDTH: u16 = 48;
const MIN_NOTICE_WIDTH: u16 = 40;

/// What the prompt is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStatus {
    Waiting,
    Working(Decision),
}

pub struct PromptView<'a> {
    pub file_name: &'a str,
    pub preview: Option<&'a PreviewImage>,
    pub remaining: Duration,
    pub status: PromptStatus,
}

pub struct NoticeView<'a> {
    pub url: &'a str,
    pub remaining: Duration,
}

/// Rectangle of the given size centred in `area`, clipped to it.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Whole seconds left, rounded up so the display never shows 0 early.
pub fn countdown_secs(remaining: Duration) -> u64 {
    remaining.as_millis().div_ceil(1000) as u64
}

/// Preview window with the upload question and Yes/No controls
pub fn render_prompt(frame: &mut Frame, view: &PromptView) {
    let area = frame.area();

    let max_cols = area.width.saturating_sub(2);
    let max_rows = area.height.saturating_sub(2 + FOOTER_ROWS);
    let (img_cols, img_rows) = view
        .preview
        .map(|p| p.fit(max_cols, max_rows))
        .unwrap_or((0, 0));
    let has_image = img_cols > 0 && img_rows > 0;
    let body_rows = if has_image { img_rows } else { 1 };

    let window = centered(
        area,
        img_cols.max(MIN_PROMPT_WIDTH).saturating_add(2),
        body_rows + FOOTER_ROWS + 2,
    );
    frame.render_widget(Clear, window);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Image Preview: {} ", view.file_name));
    let inner = block.inner(window);
    frame.render_widget(block, window);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(body_rows), // Image
            Constraint::Length(1),         // Spacer
            Constraint::Length(1),         // Question
            Constraint::Length(1),         // Buttons
            Constraint::Length(1),         // Status
        ])
        .split(inner);

    match view.preview {
        Some(preview) if has_image => {
            let lines = preview.render_lines(img_cols, img_rows);
            frame.render_widget(Paragraph::new(lines), centered(chunks[0], img_cols, img_rows));
        }
        _ => {
            let placeholder = Paragraph::new("Preview unavailable")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(placeholder, chunks[0]);
        }
    }

    let question = Paragraph::new("Do you want to upload this image to Imgur?")
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(question, chunks[2]);

    frame.render_widget(
        Paragraph::new(button_line(view.status)).alignment(Alignment::Center),
        chunks[3],
    );

    let status = match view.status {
        PromptStatus::Waiting => Span::styled(
            format!(
                "Keeping it local in {}s",
                countdown_secs(view.remaining)
            ),
            Style::default().fg(Color::DarkGray),
        ),
        PromptStatus::Working(Decision::UploadAndArchive) => Span::styled(
            "Uploading and archiving...",
            Style::default().fg(Color::LightYellow),
        ),
        PromptStatus::Working(Decision::ArchiveOnly) => {
            Span::styled("Archiving...", Style::default().fg(Color::LightYellow))
        }
    };
    frame.render_widget(Paragraph::new(status).alignment(Alignment::Center), chunks[4]);
}

fn button_line(status: PromptStatus) -> Line<'static> {
    let chosen = match status {
        PromptStatus::Working(decision) => Some(decision),
        PromptStatus::Waiting => None,
    };
    let button = |label: &'static str, color: Color, decision: Decision| {
        let mut style = Style::default().fg(color).add_modifier(Modifier::BOLD);
        if chosen == Some(decision) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        Span::styled(label, style)
    };

    Line::from(vec![
        button("[ Y ] Yes", Color::Cyan, Decision::UploadAndArchive),
        Span::raw("     "),
        button("[ N ] No", Color::LightRed, Decision::ArchiveOnly),
    ])
}

/// Transient "upload successful" confirmation
pub fn render_notice(frame: &mut Frame, view: &NoticeView) {
    let area = frame.area();
    let url_width = u16::try_from(view.url.chars().count()).unwrap_or(u16::MAX);
    let window = centered(
        area,
        url_width.saturating_add(4).max(MIN_NOTICE_WIDTH),
        6,
    );
    frame.render_widget(Clear, window);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Upload Successful! ");

    let lines = vec![
        Line::from("Upload to Imgur successful."),
        Line::from(Span::styled(
            view.url.to_string(),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "[ Ok ]",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  closes in {}s", countdown_secs(view.remaining)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center),
        window,
    );
}
