use crate::api::{BrowserFile, GlooDocumentService};
use crate::components::handlers::{file_from_drop, file_from_input, file_from_paste};
use crate::components::results::render_result;
use gloo_events::EventListener;
use shared::upload::check_upload;
use shared::{
    AttachedFile, ClientError, MediaType, ProcessingResult, ResultView, Session, Triage,
    ValidationError, process_document, render,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UploadSectionProps {
    pub session: Session,
    pub service: GlooDocumentService,
    pub on_open_review: Callback<()>,
}

pub enum Msg {
    FileChosen(Option<BrowserFile>),
    SetDragging(bool),
    Paste(ClipboardEvent),
    Process,
    Processed(Result<(ProcessingResult, Triage), ClientError>),
}

pub struct UploadSection {
    file: Option<BrowserFile>,
    processing: bool,
    outcome: Option<(ResultView, Triage)>,
    error: Option<String>,
    is_dragging: bool,
    _paste_listener: Option<EventListener>,
}

impl Component for UploadSection {
    type Message = Msg;
    type Properties = UploadSectionProps;

    fn create(ctx: &Context<Self>) -> Self {
        let paste_listener = web_sys::window().map(|window| {
            let link = ctx.link().clone();
            EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::Paste(clipboard_event.clone()));
                }
            })
        });

        Self {
            file: None,
            processing: false,
            outcome: None,
            error: None,
            is_dragging: false,
            _paste_listener: paste_listener,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::FileChosen(file) => self.handle_file_chosen(file),
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::Paste(event) => match file_from_paste(&event) {
                Some(file) => self.handle_file_chosen(Some(file)),
                None => false,
            },
            Msg::Process => self.handle_process(ctx),
            Msg::Processed(outcome) => {
                self.processing = false;
                match outcome {
                    Ok((result, triage)) => {
                        self.outcome = Some((render(&result), triage));
                        self.error = None;
                    }
                    Err(err) => {
                        self.outcome = None;
                        self.error = Some(err.to_string());
                    }
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="upload-page">
                <div class="upload-section">
                    { self.render_file_input_area(ctx) }
                    { self.render_actions(ctx) }
                </div>
                { self.render_error_message() }
                { self.render_outcome(ctx) }
            </div>
        }
    }
}

impl UploadSection {
    fn handle_file_chosen(&mut self, file: Option<BrowserFile>) -> bool {
        self.is_dragging = false;
        let Some(file) = file else {
            return true;
        };
        if self.processing {
            return false;
        }
        match check_upload(&file) {
            Ok(_) => {
                self.file = Some(file);
                self.outcome = None;
                self.error = None;
            }
            Err(err) => {
                log::warn!("Rejected upload {}: {}", file.name(), err);
                self.error = Some(err.to_string());
            }
        }
        true
    }

    fn handle_process(&mut self, ctx: &Context<Self>) -> bool {
        if self.processing {
            return false;
        }
        let Some(file) = self.file.clone() else {
            self.error = Some(ValidationError::NoFileSelected.to_string());
            return true;
        };

        self.processing = true;
        self.error = None;
        self.outcome = None;

        let props = ctx.props();
        let service = props.service.clone();
        let session = props.session.clone();
        let link = ctx.link().clone();
        spawn_local(async move {
            let outcome = process_document(&service, &session, &file).await;
            link.send_message(Msg::Processed(outcome));
        });
        true
    }

    fn render_file_input_area(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let handle_change = link.callback(|e: Event| Msg::FileChosen(file_from_input(&e)));
        let handle_drag_over = link.callback(|e: DragEvent| {
            e.prevent_default();
            Msg::SetDragging(true)
        });
        let handle_drag_leave = link.callback(|e: DragEvent| {
            e.prevent_default();
            Msg::SetDragging(false)
        });
        let handle_drop = link.callback(|e: DragEvent| Msg::FileChosen(file_from_drop(&e)));

        html! {
            <label
                for="file-input"
                class={classes!("file-input-area", self.is_dragging.then_some("dragging"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
            >
                <i class="fa-solid fa-cloud-arrow-up"></i>
                {
                    match &self.file {
                        Some(file) => html! { <p class="selected-file">{ file.name() }</p> },
                        None => html! { <p>{"Drop, paste or choose a PDF, PNG or JPG"}</p> },
                    }
                }
                <input
                    id="file-input"
                    type="file"
                    accept={MediaType::ACCEPT_ATTRIBUTE}
                    onchange={handle_change}
                    disabled={self.processing}
                    style="display: none;"
                />
            </label>
        }
    }

    fn render_actions(&self, ctx: &Context<Self>) -> Html {
        let process = ctx.link().callback(|_| Msg::Process);
        html! {
            <div class="button-group">
                <button
                    class="analyze-button"
                    onclick={process}
                    disabled={self.processing || self.file.is_none()}
                >
                    if self.processing {
                        <i class="fa-solid fa-spinner fa-spin"></i>{" Processing..."}
                    } else {
                        <i class="fa-solid fa-gears"></i>{" Process Document"}
                    }
                </button>
            </div>
        }
    }

    fn render_error_message(&self) -> Html {
        match &self.error {
            Some(error) => html! {
                <div class="error-message">
                    <i class="fa-solid fa-circle-exclamation"></i>
                    { format!(" {}", error) }
                </div>
            },
            None => html! {},
        }
    }

    fn render_outcome(&self, ctx: &Context<Self>) -> Html {
        let Some((view, triage)) = &self.outcome else {
            return html! {};
        };
        let open_review = {
            let on_open_review = ctx.props().on_open_review.clone();
            Callback::from(move |_: MouseEvent| on_open_review.emit(()))
        };
        html! {
            <>
                { render_result(view) }
                if matches!(triage, Triage::PendingReview { .. }) {
                    <button class="review-link-button" onclick={open_review}>
                        <i class="fa-solid fa-list-check"></i>{" Open Review Queue"}
                    </button>
                }
            </>
        }
    }
}
