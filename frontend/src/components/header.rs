use crate::Page;
use yew::prelude::*;

/// Renders the application header with page navigation
pub fn render_header(active: Page, on_navigate: &Callback<Page>, auth: Html) -> Html {
    html! {
        <header class="app-header">
            <div class="brand">
                <h1><i class="fa-solid fa-file-shield"></i>{" Document Intake"}</h1>
                <p class="subtitle">{"Upload, triage and review claim documents"}</p>
            </div>
            <nav class="page-tabs">
                { for Page::ALL.iter().map(|&page| {
                    let onclick = on_navigate.reform(move |_: MouseEvent| page);
                    html! {
                        <button
                            class={classes!("tab", (page == active).then_some("active"))}
                            {onclick}
                        >
                            <i class={classes!("fa-solid", page.icon())}></i>
                            { format!(" {}", page.title()) }
                        </button>
                    }
                })}
            </nav>
            { auth }
        </header>
    }
}
