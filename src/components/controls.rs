use leptos::prelude::*;
use leptos::task::spawn_local;
use log::warn;
use wasm_bindgen_futures::JsFuture;
use web_sys::{DragEvent, File, HtmlInputElement};

use crate::components::graph_view::{Legend, ViewCommand};
use crate::engine::label::LabelMode;
use crate::engine::layout::LayoutName;
use crate::engine::Swatch;

async fn read_file(file: File) -> Result<String, String> {
	let name = file.name();
	let text = JsFuture::from(file.text())
		.await
		.map_err(|e| format!("Could not read {name}: {e:?}"))?;
	text.as_string()
		.ok_or_else(|| format!("Could not read {name}: not text"))
}

/// Reads `file` and hands its contents to the view as a new document.
fn load_file(file: File, on_command: Callback<ViewCommand>, status: RwSignal<Option<String>>) {
	spawn_local(async move {
		match read_file(file).await {
			Ok(text) => on_command.run(ViewCommand::LoadText(text)),
			Err(msg) => {
				warn!("{msg}");
				status.set(Some(msg));
			}
		}
	});
}

fn swatch_list(
	swatches: Vec<Swatch>,
	on_command: Callback<ViewCommand>,
	toggle: fn(String, bool) -> ViewCommand,
) -> impl IntoView {
	swatches
		.into_iter()
		.map(|swatch| {
			let Swatch { name, color, enabled } = swatch;
			let (title, toggled) = (name.clone(), name.clone());
			view! {
				<label title=title>
					<input
						type="checkbox"
						prop:checked=enabled
						on:change=move |ev| on_command.run(toggle(toggled.clone(), event_target_checked(&ev)))
					/>
					<span class="sw" style=format!("background:{color}")></span>
					{name}
				</label>
			}
		})
		.collect_view()
}

/// Side panel with layout, label, filter, search, export and file controls.
#[component]
pub fn Controls(
	#[prop(into)] legend: Signal<Legend>,
	status: RwSignal<Option<String>>,
	on_command: Callback<ViewCommand>,
) -> impl IntoView {
	let query = RwSignal::new(String::new());
	let dragging = RwSignal::new(false);

	let on_file = move |ev: leptos::ev::Event| {
		let input = event_target::<HtmlInputElement>(&ev);
		if let Some(file) = input.files().and_then(|files| files.get(0)) {
			load_file(file, on_command, status);
		}
		input.set_value("");
	};

	let on_drop = move |ev: DragEvent| {
		ev.prevent_default();
		dragging.set(false);
		if let Some(file) = ev
			.data_transfer()
			.and_then(|dt| dt.files())
			.and_then(|files| files.get(0))
		{
			load_file(file, on_command, status);
		}
	};

	view! {
		<aside class="controls">
			<section>
				<h2>"Layout"</h2>
				<select on:change=move |ev| {
					if let Some(name) = LayoutName::parse(&event_target_value(&ev)) {
						on_command.run(ViewCommand::SelectLayout(name));
					}
				}>
					{LayoutName::ALL
						.into_iter()
						.map(|name| view! { <option value=name.as_str()>{name.title()}</option> })
						.collect_view()}
				</select>
				<button on:click=move |_| on_command.run(ViewCommand::Relayout)>"Re-layout"</button>
				<button on:click=move |_| on_command.run(ViewCommand::Fit)>"Fit"</button>
			</section>

			<section>
				<h2>"Labels"</h2>
				{[LabelMode::Full, LabelMode::Wrap, LabelMode::Short]
					.into_iter()
					.map(|mode| {
						view! {
							<label>
								<input
									type="radio"
									name="label-mode"
									value=mode.as_str()
									checked={mode == LabelMode::default()}
									on:change=move |ev| {
										if let Some(mode) = LabelMode::parse(&event_target_value(&ev)) {
											on_command.run(ViewCommand::SetLabelMode(mode));
										}
									}
								/>
								{mode.as_str()}
							</label>
						}
					})
					.collect_view()}
			</section>

			<section>
				<h2>"Search"</h2>
				<input
					type="search"
					placeholder="regex or text"
					prop:value=move || query.get()
					on:input=move |ev| {
						let value = event_target_value(&ev);
						query.set(value.clone());
						on_command.run(ViewCommand::Search(value));
					}
				/>
				<button on:click=move |_| {
					query.set(String::new());
					on_command.run(ViewCommand::ClearSearch);
				}>"Clear"</button>
			</section>

			<section>
				<h2>"Categories"</h2>
				<div class="filters">
					{move || swatch_list(legend.get().categories, on_command, ViewCommand::ToggleCategory)}
				</div>
				<h2>"Relations"</h2>
				<div class="filters">
					{move || swatch_list(legend.get().relations, on_command, ViewCommand::ToggleRelation)}
				</div>
			</section>

			<section>
				<h2>"Data"</h2>
				<input type="file" accept=".json,application/json" on:change=on_file />
				<div
					class="dropzone"
					class:active=move || dragging.get()
					on:dragover=move |ev: DragEvent| {
						ev.prevent_default();
						dragging.set(true);
					}
					on:dragleave=move |_| dragging.set(false)
					on:drop=on_drop
				>
					"Drop a JSON file here"
				</div>
				<button on:click=move |_| on_command.run(ViewCommand::ExportPng)>"Export PNG"</button>
			</section>
		</aside>
	}
}
