use crate::api::GlooDocumentService;
use gloo_timers::callback::Interval;
use shared::renderer::format_inr;
use shared::{
    ClientError, DashboardAggregator, DashboardSnapshot, DocumentService, REFRESH_INTERVAL,
    Session, Tick,
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct DashboardProps {
    pub session: Session,
    pub service: GlooDocumentService,
}

pub enum Msg {
    Tick,
    Fetched(Tick, Result<DashboardSnapshot, ClientError>),
}

/// KPI cards and ranked lists, refreshed on a fixed interval while mounted.
pub struct Dashboard {
    aggregator: DashboardAggregator,
    updated_at: Option<String>,
    interval: Option<Interval>,
}

impl Component for Dashboard {
    type Message = Msg;
    type Properties = DashboardProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut aggregator = DashboardAggregator::new();
        if let Some(tick) = aggregator.activate() {
            Self::fetch(ctx, tick);
        }

        let link = ctx.link().clone();
        let interval = Interval::new(REFRESH_INTERVAL.as_millis() as u32, move || {
            link.send_message(Msg::Tick);
        });

        Self {
            aggregator,
            updated_at: None,
            interval: Some(interval),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Tick => {
                if let Some(tick) = self.aggregator.begin_tick() {
                    Self::fetch(ctx, tick);
                }
                false
            }
            Msg::Fetched(tick, outcome) => {
                let succeeded = outcome.is_ok();
                let changed = self.aggregator.finish_tick(tick, outcome);
                if changed && succeeded {
                    self.updated_at = Some(String::from(
                        js_sys::Date::new_0().to_locale_time_string("en-IN"),
                    ));
                }
                changed
            }
        }
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        let Some(snapshot) = self.aggregator.snapshot() else {
            return html! {
                <div class="dashboard-page">
                    <p class="no-results-message">
                        if self.aggregator.last_error().is_some() {
                            {"Dashboard data is unavailable right now. Retrying shortly."}
                        } else {
                            <i class="fa-solid fa-spinner fa-spin"></i>{" Loading dashboard..."}
                        }
                    </p>
                </div>
            };
        };

        html! {
            <div class="dashboard-page">
                <div class="dashboard-header">
                    <h2><i class="fa-solid fa-chart-line"></i>{" Dashboard"}</h2>
                    if let Some(updated_at) = &self.updated_at {
                        <span class={classes!("updated-at", self.aggregator.last_error().map(|_| "stale"))}>
                            { format!("Updated {}", updated_at) }
                        </span>
                    }
                </div>
                <div class="kpi-cards">
                    { kpi_card("fa-file", "Documents Processed", snapshot.total_documents.to_string()) }
                    { kpi_card("fa-file-invoice", "Invoices", snapshot.total_invoices.to_string()) }
                    { kpi_card("fa-indian-rupee-sign", "Total Value", format_inr(snapshot.total_value)) }
                </div>
                <div class="ranked-lists">
                    <div class="ranked-list">
                        <h3>{"Top Vendors by Value"}</h3>
                        { ranked_list(snapshot.vendors_ranked().into_iter().map(|(name, total)| (name, format_inr(total)))) }
                    </div>
                    <div class="ranked-list">
                        <h3>{"Documents by Type"}</h3>
                        { ranked_list(snapshot.distribution_ranked().into_iter().map(|(name, count)| (name, count.to_string()))) }
                    </div>
                </div>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.aggregator.deactivate();
        // Dropping the handle clears the browser interval.
        self.interval = None;
    }
}

impl Dashboard {
    fn fetch(ctx: &Context<Self>, tick: Tick) {
        let props = ctx.props();
        let service = props.service.clone();
        let session = props.session.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            let outcome = service.fetch_dashboard(&session).await;
            link.send_message(Msg::Fetched(tick, outcome));
        });
    }
}

fn kpi_card(icon: &'static str, title: &'static str, value: String) -> Html {
    html! {
        <div class="kpi-card">
            <i class={classes!("fa-solid", icon)}></i>
            <div class="kpi-title">{ title }</div>
            <div class="kpi-value">{ value }</div>
        </div>
    }
}

fn ranked_list<'a>(rows: impl Iterator<Item = (&'a str, String)>) -> Html {
    let rows: Vec<Html> = rows
        .map(|(name, value)| {
            html! {
                <li>
                    <span class="ranked-name">{ name.to_string() }</span>
                    <span class="ranked-value">{ value }</span>
                </li>
            }
        })
        .collect();
    if rows.is_empty() {
        return html! { <p class="no-results-message">{"No data yet."}</p> };
    }
    html! { <ol>{ for rows }</ol> }
}
