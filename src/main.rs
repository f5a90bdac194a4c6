use std::time::{Duration, Instant};

use anyhow::Result;
use citymap_core::ConfigError;
use citymap_ui::{AppServices, HeadlessMap, PopupState, Route, Shell};

const FORECAST_WAIT: Duration = Duration::from_secs(15);

fn main() -> Result<()> {
    // Initialize core
    citymap_core::init()?;

    let mut app = match citymap_core::App::new() {
        Ok(app) => app,
        Err(e) => {
            if let Some(config_error) = e.downcast_ref::<ConfigError>() {
                eprintln!("{}", config_error.user_message());
            }
            return Err(e);
        }
    };
    let services = AppServices::new()?;
    services.init_weather_provider(&app.config().weather);

    tracing::info!("CityMap started");

    let path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let mut shell = Shell::new(services.clone(), app.config().map.clone(), HeadlessMap::new);

    println!("CityMap");
    println!("  Config directory: {}", app.config().config_dir.display());
    let route = shell.navigate(&path).clone();
    println!("  Route: {}", route.path());

    if let Route::City { .. } = route {
        shell.poll();
        open_selected_popup(&mut shell);
    }

    print_sidebar(&shell);

    // Graceful shutdown
    drop(shell);
    services.shutdown();
    app.shutdown()?;

    Ok(())
}

/// Click the routed city's marker and print the popup once it settles
fn open_selected_popup<F: FnMut() -> HeadlessMap>(shell: &mut Shell<HeadlessMap, F>) {
    let Some(page) = shell.city_page_mut() else {
        return;
    };

    if let Some(banner) = page.banner() {
        println!("\n! {}", banner);
        return;
    }

    let Some(city) = page.selected() else {
        println!("\nWorld view: click a city in the list to see its weather.");
        return;
    };
    let Some(marker) = page.surface().marker_for_city(&city.slug) else {
        println!("\nMap did not finish loading.");
        return;
    };

    page.widget().click_marker(marker);
    let deadline = Instant::now() + FORECAST_WAIT;
    loop {
        page.poll();
        if !matches!(page.popup_state(), PopupState::Loading) || Instant::now() >= deadline {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    if let Some(popup) = page.widget().single_popup() {
        println!("\n{}", popup.html);
    }
}

fn print_sidebar<F: FnMut() -> HeadlessMap>(shell: &Shell<HeadlessMap, F>) {
    println!("\nCities:");
    for city in shell.sidebar().visible() {
        let marker = if shell.sidebar().is_selected(&city.slug) {
            '*'
        } else {
            ' '
        };
        println!("  {} {:<16} {}", marker, city.title, city.path());
    }
}
