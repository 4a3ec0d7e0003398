mod api;
mod components;

use api::GlooDocumentService;
use components::auth_button::AuthButton;
use components::dashboard::Dashboard;
use components::header::render_header;
use components::review_queue::ReviewQueue;
use components::upload_section::UploadSection;
use components::utils::restore_session;
use shared::Session;
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Upload,
    Review,
    Dashboard,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Upload, Page::Review, Page::Dashboard];

    pub fn title(self) -> &'static str {
        match self {
            Page::Upload => "Upload",
            Page::Review => "Review Queue",
            Page::Dashboard => "Dashboard",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Page::Upload => "fa-upload",
            Page::Review => "fa-list-check",
            Page::Dashboard => "fa-chart-line",
        }
    }
}

enum Msg {
    SessionChanged(Option<Session>),
    Navigate(Page),
}

struct App {
    session: Option<Session>,
    page: Page,
    service: GlooDocumentService,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        let session = restore_session();
        log::info!("Session {}", if session.is_some() { "restored" } else { "absent" });
        Self {
            session,
            page: Page::Upload,
            service: GlooDocumentService::default(),
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SessionChanged(session) => {
                if session.is_none() {
                    log::info!("Signed out");
                    self.page = Page::Upload;
                }
                self.session = session;
                true
            }
            Msg::Navigate(page) => {
                if self.page == page {
                    return false;
                }
                self.page = page;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let auth = html! {
            <AuthButton
                session={self.session.clone()}
                service={self.service.clone()}
                on_session_change={link.callback(Msg::SessionChanged)}
            />
        };

        let Some(session) = self.session.clone() else {
            return html! {
                <div class="container sign-in-screen">
                    <h1><i class="fa-solid fa-file-shield"></i>{" Document Intake"}</h1>
                    <p>{"Sign in to upload and review documents."}</p>
                    { auth }
                </div>
            };
        };

        let on_navigate = link.callback(Msg::Navigate);
        let service = self.service.clone();
        let content = match self.page {
            Page::Upload => html! {
                <UploadSection
                    session={session}
                    service={service}
                    on_open_review={link.callback(|_| Msg::Navigate(Page::Review))}
                />
            },
            Page::Review => html! { <ReviewQueue session={session} service={service} /> },
            Page::Dashboard => html! { <Dashboard session={session} service={service} /> },
        };

        html! {
            <div class="container">
                { render_header(self.page, &on_navigate, auth) }
                <main class="main-content">
                    { content }
                </main>
                <footer class="app-footer">
                    <p>{"Document Intake | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<App>::new().render();
}
