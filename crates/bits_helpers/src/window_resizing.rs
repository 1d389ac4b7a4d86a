/// Largest surface wgpu accepts on most mobile GPUs.
#[cfg(target_arch = "wasm32")]
const MAX_SURFACE_SIZE: f32 = 2048.0;

/// Keeps the primary window the size of the browser viewport so the puzzle
/// area always matches what the player can touch.
#[cfg(target_arch = "wasm32")]
pub fn handle_browser_resize(
    mut primary_query: bevy::ecs::system::Query<
        &mut bevy::window::Window,
        bevy::ecs::query::With<bevy::window::PrimaryWindow>,
    >,
) {
    let Some((width, height)) = browser_viewport() else {
        return;
    };
    // Larger surfaces fail `Surface::configure` validation.
    let width = width.min(MAX_SURFACE_SIZE);
    let height = height.min(MAX_SURFACE_SIZE);

    for mut window in &mut primary_query {
        let resized = (window.resolution.width() - width).abs() > f32::EPSILON
            || (window.resolution.height() - height).abs() > f32::EPSILON;
        if resized {
            window.resolution.set(width, height);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_viewport() -> Option<(f32, f32)> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some((width as f32, height as f32))
}
