use crate::api::{GlooDocumentService, Identity, LOGIN_URL};
use crate::components::utils::forget_session;
use shared::{ClientError, Session};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct AuthButtonProps {
    pub session: Option<Session>,
    pub service: GlooDocumentService,
    pub on_session_change: Callback<Option<Session>>,
}

#[function_component(AuthButton)]
pub fn auth_button(props: &AuthButtonProps) -> Html {
    let identity = use_state(|| None::<Identity>);
    let loading = use_state(|| false);

    // Verify the token against the backend whenever it changes
    {
        let identity = identity.clone();
        let loading = loading.clone();
        let service = props.service.clone();
        let on_session_change = props.on_session_change.clone();

        use_effect_with(props.session.clone(), move |session| {
            if let Some(session) = session.clone() {
                spawn_local(async move {
                    loading.set(true);
                    match service.fetch_identity(&session).await {
                        Ok(verified) => {
                            log::info!("Signed in as {}", verified.display_name());
                            identity.set(Some(verified));
                        }
                        Err(ClientError::Service { status: Some(401), detail }) => {
                            log::warn!("Stored token rejected: {}", detail);
                            forget_session();
                            identity.set(None);
                            on_session_change.emit(None);
                        }
                        Err(e) => {
                            log::error!("Could not verify identity: {}", e);
                        }
                    }
                    loading.set(false);
                });
            } else {
                identity.set(None);
            }
        });
    }

    let handle_login = Callback::from(|_| {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(LOGIN_URL);
        }
    });

    let handle_logout = {
        let identity = identity.clone();
        let on_session_change = props.on_session_change.clone();
        Callback::from(move |_| {
            forget_session();
            identity.set(None);
            on_session_change.emit(None);
        })
    };

    if *loading {
        return html! {
            <div class="auth-button-container">
                <div class="auth-loading">
                    <i class="fa-solid fa-spinner fa-spin"></i>
                    {" Loading..."}
                </div>
            </div>
        };
    }

    match (&props.session, &*identity) {
        (Some(_), Some(user)) => html! {
            <div class="auth-button-container">
                <div class="user-info">
                    <div class="user-details">
                        <span class="user-name">{ user.display_name() }</span>
                        if !user.email.is_empty() {
                            <span class="user-email">{ &user.email }</span>
                        }
                    </div>
                    <button class="logout-button" onclick={handle_logout} title="Sign out">
                        <i class="fa-solid fa-sign-out-alt"></i>
                        {" Sign out"}
                    </button>
                </div>
            </div>
        },
        (Some(_), None) => html! {
            <div class="auth-button-container">
                <button class="logout-button" onclick={handle_logout} title="Sign out">
                    <i class="fa-solid fa-sign-out-alt"></i>
                    {" Sign out"}
                </button>
            </div>
        },
        (None, _) => html! {
            <div class="auth-button-container">
                <button class="login-button" onclick={handle_login} title="Sign in">
                    <i class="fa-solid fa-right-to-bracket"></i>
                    {" Sign in"}
                </button>
            </div>
        },
    }
}
