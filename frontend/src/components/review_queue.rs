use crate::api::{BrowserFile, GlooDocumentService};
use crate::components::handlers::file_from_input;
use crate::components::results::render_result;
use crate::components::utils::debounce;
use shared::{
    AttachedFile, ClientError, DocumentService, DocumentType, Listing, MediaType,
    ProcessingResult, ReviewQueueEntry, ReviewReconciler, ReviewState, Session,
    render,
};
use std::str::FromStr;
use strum::IntoEnumIterator;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ReviewQueueProps {
    pub session: Session,
    pub service: GlooDocumentService,
}

pub enum Msg {
    Refresh,
    QueueLoaded(Listing, Result<Vec<ReviewQueueEntry>, ClientError>),
    Open(String),
    Close,
    FileChosen(Option<BrowserFile>),
    TypeSelected(Option<DocumentType>),
    Confirm,
    Confirmed(Result<ProcessingResult, ClientError>),
}

pub struct ReviewQueue {
    reconciler: ReviewReconciler<BrowserFile>,
    loading: bool,
    refresh_pending: bool,
    list_error: Option<String>,
    inline_error: Option<String>,
}

impl Component for ReviewQueue {
    type Message = Msg;
    type Properties = ReviewQueueProps;

    fn create(ctx: &Context<Self>) -> Self {
        ctx.link().send_message(Msg::Refresh);
        Self {
            reconciler: ReviewReconciler::new(),
            loading: false,
            refresh_pending: false,
            list_error: None,
            inline_error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Refresh => self.handle_refresh(ctx),
            Msg::QueueLoaded(listing, outcome) => {
                self.loading = false;
                match outcome {
                    Ok(entries) => {
                        self.reconciler.finish_listing(listing, entries);
                        self.list_error = None;
                    }
                    Err(err) => self.list_error = Some(err.to_string()),
                }
                if std::mem::take(&mut self.refresh_pending) {
                    ctx.link().send_message(Msg::Refresh);
                }
                true
            }
            Msg::Open(filename) => {
                self.inline_error = self.reconciler.open(&filename).err().map(|e| e.to_string());
                true
            }
            Msg::Close => {
                self.inline_error = None;
                self.reconciler.close()
            }
            Msg::FileChosen(Some(file)) => {
                if let Err(err) = self.reconciler.attach_file(file) {
                    log::info!("Attachment rejected: {}", err);
                }
                true
            }
            Msg::FileChosen(None) => false,
            Msg::TypeSelected(document_type) => {
                self.inline_error = self
                    .reconciler
                    .select_type(document_type)
                    .err()
                    .map(|e| e.to_string());
                true
            }
            Msg::Confirm => self.handle_confirm(ctx),
            Msg::Confirmed(outcome) => {
                if self.reconciler.finish_confirm(outcome).is_ok() {
                    ctx.link().send_message(Msg::Refresh);
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let refresh = {
            let link = ctx.link().clone();
            debounce(300, move || link.send_message(Msg::Refresh))
        };
        html! {
            <div class="review-page">
                <div class="review-toolbar">
                    <h2><i class="fa-solid fa-list-check"></i>{" Review Queue"}</h2>
                    <button class="refresh-button" onclick={refresh} disabled={self.loading}>
                        <i class={classes!("fa-solid", "fa-rotate", self.loading.then_some("fa-spin"))}></i>
                        {" Refresh"}
                    </button>
                </div>
                if let Some(error) = &self.list_error {
                    <div class="error-message">{ error }</div>
                }
                { self.render_resolved() }
                { self.render_table(ctx) }
                { self.render_dialog(ctx) }
            </div>
        }
    }
}

impl ReviewQueue {
    fn handle_refresh(&mut self, ctx: &Context<Self>) -> bool {
        if self.loading {
            // Re-issued when the outstanding listing lands.
            self.refresh_pending = true;
            return false;
        }
        self.loading = true;

        let listing = self.reconciler.begin_listing();
        let props = ctx.props();
        let service = props.service.clone();
        let session = props.session.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            let outcome = service.list_queue(&session).await;
            link.send_message(Msg::QueueLoaded(listing, outcome));
        });
        true
    }

    fn handle_confirm(&mut self, ctx: &Context<Self>) -> bool {
        let request = match self.reconciler.begin_confirm() {
            Ok(request) => request,
            Err(err) => {
                self.inline_error = Some(err.to_string());
                return true;
            }
        };
        self.inline_error = None;
        log::info!(
            "Confirming {} as {}",
            request.target_filename,
            request.corrected_type
        );

        let props = ctx.props();
        let service = props.service.clone();
        let session = props.session.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            let outcome = service.confirm_correction(&session, &request).await;
            link.send_message(Msg::Confirmed(outcome));
        });
        true
    }

    fn render_resolved(&self) -> Html {
        let Some(result) = self.reconciler.last_result() else {
            return html! {};
        };
        html! {
            <div class="resolved">
                <div class="alert alert-success">
                    <i class="fa-solid fa-circle-check"></i>
                    { format!(" {} was re-processed and removed from the queue.", result.filename) }
                </div>
                { render_result(&render(result)) }
            </div>
        }
    }

    fn render_table(&self, ctx: &Context<Self>) -> Html {
        let entries = self.reconciler.entries();
        if entries.is_empty() {
            return html! {
                <p class="no-results-message">
                    { if self.loading { "Loading review queue..." } else { "The review queue is empty." } }
                </p>
            };
        }
        let busy = self.reconciler.state() == ReviewState::Confirming;

        html! {
            <table class="review-table">
                <thead>
                    <tr>
                        <th>{"Filename"}</th>
                        <th>{"AI Guess"}</th>
                        <th>{"Confidence"}</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    { for entries.iter().map(|entry| {
                        let ambiguous = self.reconciler.is_ambiguous(&entry.filename);
                        let filename = entry.filename.clone();
                        let open = ctx.link().callback(move |_| Msg::Open(filename.clone()));
                        html! {
                            <tr class={classes!(ambiguous.then_some("duplicate-row"))}>
                                <td>
                                    { &entry.filename }
                                    if ambiguous {
                                        <span class="chip status-warning">{"duplicate"}</span>
                                    }
                                </td>
                                <td>{ entry.model_guess.label() }</td>
                                <td>{ &entry.model_confidence }</td>
                                <td>
                                    <button class="review-button" onclick={open} disabled={busy}>
                                        {"Review"}
                                    </button>
                                </td>
                            </tr>
                        }
                    })}
                </tbody>
            </table>
        }
    }

    fn render_dialog(&self, ctx: &Context<Self>) -> Html {
        let Some(entry) = self.reconciler.open_entry() else {
            return html! {};
        };
        let link = ctx.link();
        let state = self.reconciler.state();
        let confirming = state == ReviewState::Confirming;

        let on_file = link.callback(|e: Event| Msg::FileChosen(file_from_input(&e)));
        let on_type = link.callback(|e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            Msg::TypeSelected(DocumentType::from_str(&select.value()).ok())
        });
        let close = link.callback(|_| Msg::Close);
        let confirm = link.callback(|_| Msg::Confirm);
        let selected = self.reconciler.selected_type();

        html! {
            <div class="modal-backdrop">
                <div class="modal correction-dialog">
                    <h3>{ format!("Review: {}", entry.filename) }</h3>
                    <p class="modal-subtitle">
                        { format!("AI guess: {} ({})", entry.model_guess.label(), entry.model_confidence) }
                    </p>

                    <label for="correction-file">{"1. Re-upload the original file"}</label>
                    <input
                        id="correction-file"
                        type="file"
                        accept={MediaType::ACCEPT_ATTRIBUTE}
                        onchange={on_file}
                        disabled={confirming}
                    />
                    if let Some(file) = self.reconciler.attached_file() {
                        <p class="attached-file">
                            <i class="fa-solid fa-paperclip"></i>{ format!(" {}", file.name()) }
                        </p>
                    }

                    <label for="correction-type">{"2. Select the correct document type"}</label>
                    <select id="correction-type" onchange={on_type} disabled={confirming}>
                        <option value="" selected={selected.is_none()}>{"Select a type"}</option>
                        { for DocumentType::iter().map(|document_type| html! {
                            <option
                                value={document_type.label()}
                                selected={selected == Some(document_type)}
                            >
                                { document_type.label() }
                            </option>
                        })}
                    </select>

                    if let Some(notice) = self.reconciler.notice().or_else(|| self.inline_error.clone()) {
                        <div class={classes!("inline-warning", (state == ReviewState::FileMismatch).then_some("mismatch"))}>
                            <i class="fa-solid fa-triangle-exclamation"></i>{ format!(" {}", notice) }
                        </div>
                    }

                    <div class="modal-actions">
                        <button class="cancel-button" onclick={close} disabled={confirming}>
                            {"Cancel"}
                        </button>
                        <button
                            class="confirm-button"
                            onclick={confirm}
                            disabled={!self.reconciler.can_confirm()}
                        >
                            if confirming {
                                <i class="fa-solid fa-spinner fa-spin"></i>{" Processing..."}
                            } else {
                                {"Confirm & Process"}
                            }
                        </button>
                    </div>
                </div>
            </div>
        }
    }
}
