//! Thin web-sys glue: listeners, downloads, fullscreen and file reads.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, Document, Element, EventTarget, File, HtmlAnchorElement, Url};

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
	#[error("no browser window")]
	NoWindow,
	#[error("no document")]
	NoDocument,
	#[error("browser call failed: {0}")]
	Js(String),
}

fn js_err(value: JsValue) -> BrowserError {
	BrowserError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

fn document() -> Result<Document, BrowserError> {
	web_sys::window()
		.ok_or(BrowserError::NoWindow)?
		.document()
		.ok_or(BrowserError::NoDocument)
}

/// A DOM listener removed again when dropped.
pub struct EventListener {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(web_sys::Event)>,
}

impl EventListener {
	pub fn new(
		target: &EventTarget,
		event: &'static str,
		f: impl FnMut(web_sys::Event) + 'static,
	) -> Result<Self, BrowserError> {
		let callback = Closure::<dyn FnMut(web_sys::Event)>::new(f);
		target
			.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
			.map_err(js_err)?;
		Ok(Self {
			target: target.clone(),
			event,
			callback,
		})
	}
}

impl Drop for EventListener {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// Calls `on_change` with the new state whenever the document enters or
/// leaves fullscreen.
pub fn watch_fullscreen(on_change: impl Fn(bool) + 'static) -> Result<EventListener, BrowserError> {
	let document = document()?;
	let observed = document.clone();
	EventListener::new(&document, "fullscreenchange", move |_| {
		on_change(observed.fullscreen_element().is_some());
	})
}

pub fn toggle_fullscreen(element: &Element) -> Result<(), BrowserError> {
	let document = document()?;
	if document.fullscreen_element().is_some() {
		document.exit_fullscreen();
		Ok(())
	} else {
		element.request_fullscreen().map_err(js_err)
	}
}

/// Offers `contents` as a file download.
pub fn download_text(file_name: &str, mime: &str, contents: &str) -> Result<(), BrowserError> {
	let document = document()?;
	let parts = js_sys::Array::of1(&JsValue::from_str(contents));
	let options = BlobPropertyBag::new();
	options.set_type(mime);
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_err)?;
	let url = Url::create_object_url_with_blob(&blob).map_err(js_err)?;

	let anchor: HtmlAnchorElement = document
		.create_element("a")
		.map_err(js_err)?
		.dyn_into()
		.map_err(|_| BrowserError::Js("created element is not an anchor".into()))?;
	anchor.set_href(&url);
	anchor.set_download(file_name);
	anchor.click();
	Url::revoke_object_url(&url).map_err(js_err)
}

pub async fn read_file_text(file: &File) -> Result<String, BrowserError> {
	let text = JsFuture::from(file.text()).await.map_err(js_err)?;
	text.as_string()
		.ok_or_else(|| BrowserError::Js("file did not decode as text".into()))
}
