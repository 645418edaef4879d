/// Main page: link input, extract trigger, results, theme toggle

use crate::api::FetchBackend;
use crate::config::AppConfig;
use crate::controller::{
    BackendStatus, ConnectivityGuardedView, ExtractView, extract, probe_backend,
};
use crate::error::describe_js;
use crate::media::ResultSet;
use crate::theme::{Theme, apply_theme, load_theme, local_storage, toggle_theme};
use crate::ui::components::MediaCard;
use patternfly_yew::prelude::*;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Element, HtmlInputElement, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: Rc<AppConfig>,
}

/// State handles the extraction flow writes to, gathered once per render
#[derive(Clone)]
struct PageHandles {
    loading: UseStateHandle<bool>,
    error: UseStateHandle<Option<String>>,
    results: UseStateHandle<Option<ResultSet>>,
    shake: UseStateHandle<bool>,
}

impl ExtractView for PageHandles {
    fn set_loading(&self, loading: bool) {
        self.loading.set(loading);
    }

    fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));
        self.shake.set(true);
    }

    fn clear_error(&self) {
        self.error.set(None);
    }

    fn hide_results(&self) {
        self.results.set(None);
    }

    fn show_results(&self, results: ResultSet) {
        self.results.set(Some(results));
    }
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let config = props.config.clone();
    let backend = use_memo(config.clone(), |config| FetchBackend::new(config));

    let url_input = use_state(String::new);
    let loading = use_state(|| false);
    let error = use_state(|| None::<String>);
    let results = use_state(|| None::<ResultSet>);
    let shake = use_state(|| false);
    let backend_down = use_state(|| false);
    let backend_status = use_memo((), |_| BackendStatus::default());
    let theme = {
        let key = config.theme_key.clone();
        use_state(move || {
            local_storage()
                .map(|store| load_theme(&store, &key))
                .unwrap_or_default()
        })
    };
    let result_ref = use_node_ref();

    let handles = PageHandles {
        loading: loading.clone(),
        error: error.clone(),
        results: results.clone(),
        shake: shake.clone(),
    };

    // Liveness probe and worker registration, once on mount
    {
        let backend = backend.clone();
        let error = error.clone();
        let backend_down = backend_down.clone();
        let backend_status = backend_status.clone();
        let worker_path = config.service_worker_path.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                if let Err(e) = probe_backend(&*backend).await {
                    backend_status.mark_down();
                    error.set(Some(e.user_message()));
                    backend_down.set(true);
                }
            });
            register_service_worker(&worker_path);
            || ()
        });
    }

    // Keep <html data-theme> in sync
    use_effect_with(*theme, |theme| {
        if let Err(e) = apply_theme(*theme) {
            log::warn!("Could not apply theme: {}", e);
        }
        || ()
    });

    // Bring each new result set into view
    {
        let result_ref = result_ref.clone();
        let shown = results.as_ref().map(|set| set.id);

        use_effect_with(shown, move |shown| {
            if shown.is_some() {
                if let Some(section) = result_ref.cast::<Element>() {
                    let options = ScrollIntoViewOptions::new();
                    options.set_behavior(ScrollBehavior::Smooth);
                    options.set_block(ScrollLogicalPosition::Center);
                    section.scroll_into_view_with_scroll_into_view_options(&options);
                }
            }
            || ()
        });
    }

    let on_input = {
        let url_input = url_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                url_input.set(input.value());
            }
        })
    };

    // No de-duplication: every trigger starts its own request
    let on_extract = {
        let backend = backend.clone();
        let url_input = url_input.clone();
        let backend_status = backend_status.clone();

        Callback::from(move |_: ()| {
            if backend_status.is_down() {
                return;
            }
            let backend = backend.clone();
            let view = ConnectivityGuardedView::new(handles.clone(), (*backend_status).clone());
            let raw = (*url_input).clone();

            spawn_local(async move {
                let _ = extract(&*backend, &view, &raw).await;
            });
        })
    };

    let on_click = on_extract.reform(|_: MouseEvent| ());

    let on_keypress = {
        let on_extract = on_extract.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                on_extract.emit(());
            }
        })
    };

    let on_shake_end = {
        let shake = shake.clone();
        Callback::from(move |_| shake.set(false))
    };

    let on_toggle_theme = {
        let theme = theme.clone();
        let key = config.theme_key.clone();

        Callback::from(move |_: MouseEvent| {
            let next = match local_storage().and_then(|store| toggle_theme(&store, &key, *theme)) {
                Ok(next) => next,
                Err(e) => {
                    log::warn!("Theme not persisted: {}", e);
                    theme.toggled()
                }
            };
            theme.set(next);
        })
    };

    let is_busy = *loading || *backend_down;

    html! {
        <div class="container">
            <header class="header">
                <h1 class="main-title">{"Instagram Downloader"}</h1>
                <button class="theme-toggle" onclick={on_toggle_theme}>
                    {if *theme == Theme::Dark { "☀️" } else { "🌙" }}
                </button>
            </header>

            <div class="input-group">
                <input
                    type="text"
                    placeholder="Paste an Instagram post, reel or story link..."
                    value={(*url_input).clone()}
                    oninput={on_input}
                    onkeypress={on_keypress}
                    onanimationend={on_shake_end}
                    class={classes!("url-input", shake.then_some("shake"))}
                />
                <Button onclick={on_click} disabled={is_busy} variant={ButtonVariant::Primary}>
                    if *loading {
                        <Spinner />
                    } else {
                        <span class="btn-text">{"Download"}</span>
                    }
                </Button>
            </div>

            if let Some(message) = (*error).clone() {
                <div class="message-top-margin">
                    <Alert r#type={AlertType::Danger} title={message} inline={true}>
                    </Alert>
                </div>
            }

            <section
                ref={result_ref}
                class={classes!("result-section", results.is_none().then_some("hidden"))}
            >
                if let Some(set) = (*results).clone() {
                    <div class="media-container">
                        {for set.items.iter().enumerate().map(|(index, item)| html! {
                            <MediaCard
                                key={format!("{}-{}", set.id, index)}
                                item={item.clone()}
                                index={index}
                            />
                        })}
                    </div>
                }
            </section>
        </div>
    }
}

// Helper functions

fn register_service_worker(path: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let navigator = window.navigator();

    if !js_sys::Reflect::has(&navigator, &JsValue::from_str("serviceWorker")).unwrap_or(false) {
        log::info!("Service workers unsupported, running without offline cache");
        return;
    }

    let registration = navigator.service_worker().register(path);
    let path = path.to_string();
    spawn_local(async move {
        match JsFuture::from(registration).await {
            Ok(_) => log::info!("Registered offline cache worker at {}", path),
            Err(e) => log::warn!("Service worker registration failed: {}", describe_js(&e)),
        }
    });
}
