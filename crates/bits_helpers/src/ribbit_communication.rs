use std::sync::{Arc, LazyLock};

use bevy::prelude::*;
use parking_lot::Mutex;
use ribbit_bits::{BitDuration, BitMessage, BitParameters, BitResult, RibbitMessage};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::MessageEvent;

/// Messages received from Ribbit, drained once per frame.
pub static RIBBIT_MESSAGE_QUEUE: LazyLock<Arc<Mutex<Vec<RibbitMessage>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

/// Messages a native build would have posted to Ribbit.
#[cfg(not(target_arch = "wasm32"))]
pub static BIT_MESSAGE_QUEUE: LazyLock<Arc<Mutex<Vec<BitMessage>>>> =
    LazyLock::new(|| Arc::new(Mutex::new(Vec::new())));

#[cfg(target_arch = "wasm32")]
fn listen_ribbit_messages() {
    let Some(window) = web_sys::window() else {
        error!("No global window, Ribbit messages will not be received");
        return;
    };

    let on_message = Closure::wrap(Box::new(move |event: MessageEvent| {
        match serde_wasm_bindgen::from_value::<RibbitMessage>(event.data()) {
            Ok(message) => RIBBIT_MESSAGE_QUEUE.lock().push(message),
            Err(err) => error!("Could not parse ribbit message {:?}: {err}", event.data()),
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Err(err) =
        window.add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
    {
        error!("Could not listen to Ribbit messages: {err:?}");
        return;
    }

    // The listener lives as long as the page does.
    on_message.forget();
}

#[cfg(not(target_arch = "wasm32"))]
pub fn send_bit_message(message: BitMessage) {
    BIT_MESSAGE_QUEUE.lock().push(message);
}

#[cfg(target_arch = "wasm32")]
pub fn send_bit_message(message: BitMessage) {
    let Some(window) = web_sys::window() else {
        error!("{message:?} not sent, no global window");
        return;
    };
    let Ok(payload) = serde_wasm_bindgen::to_value(&message) else {
        error!("Could not serialize {message:?}");
        return;
    };
    let Ok(Some(parent)) = window.parent() else {
        error!("{message:?} not sent, parent window not found");
        return;
    };

    if let Err(err) = parent.post_message(&payload, "*") {
        error!("Could not post message {payload:?}. {err:?}");
    }
}

/// Hooks a bit exposes to the Ribbit platform.
///
/// They run with exclusive world access when the matching message arrives and
/// are not meant to be called by the bit itself.
pub trait RibbitMessageHandler: Send + Sync + Default + 'static {
    fn duration(world: &mut World) -> BitDuration;
    fn end(world: &mut World) -> BitResult;
    fn restart(world: &mut World);
}

fn process_ribbit_messages<T: RibbitMessageHandler>(world: &mut World) {
    let messages: Vec<_> = RIBBIT_MESSAGE_QUEUE.lock().drain(..).collect();

    for message in messages {
        match message {
            RibbitMessage::Parameters => {
                let duration = T::duration(world);
                send_bit_message(BitMessage::Parameters(BitParameters { duration }));
            }
            RibbitMessage::Start => info!("Ribbit started the bit"),
            RibbitMessage::Restart => T::restart(world),
            RibbitMessage::End => {
                let result = T::end(world);
                send_bit_message(BitMessage::End(result));
            }
        }
    }
}

fn ready() {
    send_bit_message(BitMessage::Ready);
}

/// Stands in for Ribbit on desktop: R restarts the bit, E ends it.
#[cfg(not(target_arch = "wasm32"))]
fn simulate_ribbit_keys(keys: Res<ButtonInput<KeyCode>>) {
    let mut queue = RIBBIT_MESSAGE_QUEUE.lock();
    if keys.just_pressed(KeyCode::KeyR) {
        queue.push(RibbitMessage::Restart);
    }
    if keys.just_pressed(KeyCode::KeyE) {
        queue.push(RibbitMessage::End);
    }
}

/// Logs what the bit reported, since no parent page receives it.
#[cfg(not(target_arch = "wasm32"))]
fn drain_bit_messages() {
    for message in BIT_MESSAGE_QUEUE.lock().drain(..) {
        info!("Bit message: {message:?}");
    }
}

#[derive(Default)]
pub struct RibbitCommunicationPlugin<T: RibbitMessageHandler>(core::marker::PhantomData<T>);

impl<T: RibbitMessageHandler> Plugin for RibbitCommunicationPlugin<T> {
    fn build(&self, app: &mut App) {
        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, listen_ribbit_messages);
        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(PreUpdate, simulate_ribbit_keys)
            .add_systems(Last, drain_bit_messages);

        app.add_systems(PostStartup, ready)
            .add_systems(PostUpdate, process_ribbit_messages::<T>);
    }
}
