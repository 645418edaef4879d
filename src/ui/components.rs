/// Result cards for extracted media

use crate::media::{MediaDescriptor, MediaKind};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::HtmlVideoElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct BadgeProps {
    pub label: String,
}

#[function_component(Badge)]
pub fn badge(props: &BadgeProps) -> Html {
    html! {
        <span class="badge">{&props.label}</span>
    }
}

#[derive(Properties, PartialEq)]
pub struct MediaCardProps {
    pub item: MediaDescriptor,
    /// Position in the result list, used for the fallback title
    pub index: usize,
}

#[function_component(MediaCard)]
pub fn media_card(props: &MediaCardProps) -> Html {
    let item = &props.item;

    html! {
        <div class="media-item">
            <MediaPreview item={item.clone()} />
            <div class="file-details">
                <h2>{item.title(props.index)}</h2>
                <div class="meta-info">
                    <Badge label={item.size_label()} />
                    <Badge label={item.kind.label()} />
                </div>
                <div class="file-actions">
                    <a
                        href={item.download_href()}
                        class="download-btn"
                        target="_blank"
                        rel="noopener noreferrer"
                    >
                        {"⬇ Download"}
                    </a>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct MediaPreviewProps {
    pub item: MediaDescriptor,
}

#[function_component(MediaPreview)]
pub fn media_preview(props: &MediaPreviewProps) -> Html {
    let video_ref = use_node_ref();
    let item = &props.item;

    let on_play = {
        let video_ref = video_ref.clone();
        let stream = item.stream_src().map(str::to_string);

        Callback::from(move |_: MouseEvent| {
            let Some(stream) = stream.as_deref() else {
                return;
            };
            if let Some(video) = video_ref.cast::<HtmlVideoElement>() {
                play_stream(video, stream);
            }
        })
    };

    let preview = match &item.kind {
        MediaKind::Video => html! {
            <>
                <video
                    ref={video_ref}
                    class="video-preview"
                    poster={item.thumbnail_src()}
                    playsinline=true
                />
                <button class="play-overlay" onclick={on_play}>{"▶"}</button>
            </>
        },
        MediaKind::Image => html! {
            <img src={item.thumbnail_src()} alt="Media Preview" />
        },
        MediaKind::Other(_) if !item.thumbnail_src().is_empty() => html! {
            <img src={item.thumbnail_src()} alt="Media Preview" />
        },
        MediaKind::Other(_) => html! {
            <div class="file-icon-fallback">{"📄"}</div>
        },
    };

    html! {
        <div class="file-preview">
            {preview}
        </div>
    }
}

/// Point the video at its stream, start it, then try fullscreen.
/// Playback and fullscreen failures are only logged.
fn play_stream(video: HtmlVideoElement, stream: &str) {
    video.set_src(stream);
    video.set_class_name("video-preview playing");

    let started = match video.play() {
        Ok(promise) => promise,
        Err(e) => {
            log::debug!("Playback did not start: {:?}", e);
            return;
        }
    };

    spawn_local(async move {
        if let Err(e) = JsFuture::from(started).await {
            log::debug!("Playback did not start: {:?}", e);
            return;
        }
        if let Err(e) = video.request_fullscreen() {
            log::debug!("Fullscreen refused: {:?}", e);
        }
    });
}
