use shared::renderer::{
    CheckOutcome, CheckView, DisplayValue, FieldView, FieldsView, ResultBody, RiskSeverity,
    RiskView, StatusTone,
};
use shared::ResultView;
use yew::prelude::*;

pub fn render_result(view: &ResultView) -> Html {
    let tone = match view.status_tone {
        StatusTone::Primary => "status-primary",
        StatusTone::Warning => "status-warning",
    };

    html! {
        <div class={classes!("results-container", tone)}>
            <div class="result-header">
                <h2 title={format!("Results for: {}", view.filename)}>
                    <i class="fa-solid fa-file-lines"></i>
                    <span class="analyzed-filename-display">{ &view.filename }</span>
                </h2>
                <div class="result-chips">
                    <span class="chip doc-type-chip">{ view.document_type.label() }</span>
                    <span class="chip confidence-chip">{ format!("Confidence: {}", view.confidence) }</span>
                    <span class={classes!("chip", "status-chip", tone)}>{ view.status.label() }</span>
                </div>
            </div>
            { render_body(&view.body) }
            <details class="raw-text">
                <summary>{"Raw OCR text"}</summary>
                <pre>{ &view.raw_text }</pre>
            </details>
        </div>
    }
}

fn render_body(body: &ResultBody) -> Html {
    match body {
        ResultBody::ReviewDirective(directive) => html! {
            <div class="alert alert-warning review-directive">
                <i class="fa-solid fa-triangle-exclamation"></i>
                { format!(" {}", directive) }
            </div>
        },
        ResultBody::Details { risk, fields, checks } => html! {
            <>
                { render_risk(risk) }
                <div class="detailed-results">
                    <h3>{"Extracted Data"}</h3>
                    { render_fields(fields) }
                </div>
                <div class="validation-results">
                    <h3>{"Validation"}</h3>
                    { render_checks(checks) }
                </div>
            </>
        },
    }
}

fn render_risk(risk: &RiskView) -> Html {
    let (class, icon) = match risk.severity {
        RiskSeverity::Positive => ("alert-success", "fa-circle-check"),
        RiskSeverity::Caution => ("alert-warning", "fa-triangle-exclamation"),
        RiskSeverity::Unknown => ("alert-muted", "fa-circle-question"),
        RiskSeverity::Neutral => ("alert-info", "fa-circle-info"),
    };
    html! {
        <div class={classes!("alert", "risk-alert", class)}>
            <i class={classes!("fa-solid", icon)}></i>
            <strong>{" Risk Analysis: "}</strong>
            { &risk.text }
        </div>
    }
}

fn render_fields(fields: &FieldsView) -> Html {
    match fields {
        FieldsView::Fallback(notice) => html! {
            <p class="no-results-message">{ *notice }</p>
        },
        FieldsView::Projected(fields) => html! {
            <div class="field-grid">
                { for fields.iter().map(render_field) }
            </div>
        },
    }
}

fn render_field(field: &FieldView) -> Html {
    let value = match &field.value {
        DisplayValue::Text(text) => html! { <div class="field-value">{ text }</div> },
        DisplayValue::Items(items) if items.is_empty() => {
            html! { <div class="field-value">{"None reported"}</div> }
        }
        DisplayValue::Items(items) => html! {
            <ul class="field-value">
                { for items.iter().map(|item| html! { <li>{ item }</li> }) }
            </ul>
        },
    };
    html! {
        <div class={classes!("field-item", field.wide.then_some("field-wide"))}>
            <div class="field-label">{ field.label }</div>
            { value }
        </div>
    }
}

fn render_checks(checks: &[CheckView]) -> Html {
    if checks.is_empty() {
        return html! { <p class="no-results-message">{"No validation checks reported."}</p> };
    }
    html! {
        <ul class="validation-list">
            { for checks.iter().map(|check| {
                let (class, icon) = match check.outcome {
                    CheckOutcome::Pass => ("check-pass", "fa-check"),
                    CheckOutcome::Fail => ("check-fail", "fa-xmark"),
                };
                html! {
                    <li class={class}>
                        <i class={classes!("fa-solid", icon)}></i>
                        <strong>{ format!(" {}: ", check.name) }</strong>
                        { &check.detail }
                    </li>
                }
            })}
        </ul>
    }
}
