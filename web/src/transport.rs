use anyhow::{Result, anyhow};
use tessera_core::TransportEvent;
use tessera_protocol::{ClientFrame, ServerFrame};
use wasm_bindgen::prelude::*;
use web_sys::{Event, MessageEvent, WebSocket};
use yew::Callback;

/// WebSocket to the relay; socket handlers live as long as this value.
pub(crate) struct Transport {
    socket: WebSocket,
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
    _on_close: Closure<dyn FnMut(Event)>,
}

impl Transport {
    pub(crate) fn connect(url: &str, on_event: Callback<TransportEvent>) -> Result<Self> {
        let socket = WebSocket::new(url).map_err(|err| anyhow!("Could not open {url}: {err:?}"))?;

        let on_open = {
            let on_event = on_event.clone();
            Closure::<dyn FnMut(Event)>::new(move |_| on_event.emit(TransportEvent::Connected))
        };
        let on_message = {
            let on_event = on_event.clone();
            Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                let Some(text) = event.data().as_string() else {
                    log::warn!("Ignoring non-text frame");
                    return;
                };
                match ServerFrame::from_text(&text) {
                    Ok(frame) => on_event.emit(frame.into()),
                    Err(err) => log::warn!("Ignoring frame: {err}"),
                }
            })
        };
        let on_error = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            log::warn!("Socket error: {:?}", event.type_());
        });
        let on_close = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.emit(TransportEvent::Disconnected)
        });

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        log::debug!("Connecting to {url}");

        Ok(Self {
            socket,
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
            _on_close: on_close,
        })
    }

    pub(crate) fn send(&self, frame: &ClientFrame) -> Result<()> {
        let text = frame.to_text()?;
        log::debug!("Sending {text}");
        self.socket
            .send_with_str(&text)
            .map_err(|err| anyhow!("Could not send frame: {err:?}"))
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onerror(None);
        self.socket.set_onclose(None);
        if let Err(err) = self.socket.close() {
            log::warn!("Could not close socket: {err:?}");
        }
    }
}
