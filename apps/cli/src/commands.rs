//! Command loop for the terminal client
//!
//! Each command stands in for one of the application's screens. Guarded
//! commands evaluate the same gates the web views would: while the session
//! is still resolving they show a neutral waiting line, never the
//! signed-in or signed-out variant.

use anyhow::Result;
use chrono::NaiveDate;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use backend::models::{BookingStatus, NewBooking, NewTeam, NewVenue, VenueStatus};
use backend::repositories::{
    ArticleRepository, BookingRepository, EventRepository, TeamRepository, VenueRepository,
};
use backend::{FilterOp, ProfileClient, TableQuery, UpdateProfile};
use common::validation;
use session::{Access, Gate, Identity, SessionManager};

pub struct App {
    pub manager: SessionManager,
    pub profiles: ProfileClient,
    pub venues: VenueRepository,
    pub bookings: BookingRepository,
    pub teams: TeamRepository,
    pub events: EventRepository,
    pub articles: ArticleRepository,
}

pub async fn run(app: App) -> Result<()> {
    println!("SportsSpot: book venues, join teams.");
    println!("Resolving session...");

    let state = app.manager.resolved().await;
    match state.identity() {
        Some(identity) => println!("Signed in as {}.", identity.email),
        None => println!("Browsing as guest."),
    }
    println!("Type `help` for commands.");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match command {
            "help" => help(),
            "quit" | "exit" => break,
            "login" => login(&app, &args).await,
            "signup" => signup(&app, &args).await,
            "logout" => logout(&app).await,
            "whoami" => whoami(&app).await,
            "profile" => profile(&app).await,
            "update-profile" => update_profile(&app, &args).await,
            "venues" => venues(&app).await,
            "venue" => venue(&app, &args).await,
            "search" => search(&app, &args).await,
            "book" => book(&app, &args).await,
            "bookings" => bookings(&app).await,
            "booking" => booking(&app, &args).await,
            "teams" => teams(&app).await,
            "my-teams" => my_teams(&app).await,
            "create-team" => create_team(&app, &args).await,
            "events" => events(&app).await,
            "articles" => articles(&app).await,
            "pending" => pending(&app).await,
            "approve" => set_booking_status(&app, &args, BookingStatus::Confirmed).await,
            "cancel" => set_booking_status(&app, &args, BookingStatus::Cancelled).await,
            "add-venue" => add_venue(&app, &args).await,
            "open-venue" => set_venue_status(&app, &args, VenueStatus::Active).await,
            "close-venue" => set_venue_status(&app, &args, VenueStatus::Inactive).await,
            "remove-venue" => remove_venue(&app, &args).await,
            "grant-admin" => grant_admin(&app, &args).await,
            other => println!("Unknown command `{other}`; type `help`."),
        }
    }

    println!("Goodbye.");
    Ok(())
}

fn prompt() {
    use std::io::Write as _;
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn help() {
    println!("Commands:");
    println!("  login <email> <password>");
    println!("  signup <email> <password> <phone> <full name...>");
    println!("  logout | whoami | profile");
    println!("  update-profile <first>;<last>;<phone>         (signed-in)");
    println!("  venues | venue <id> | search <sport>");
    println!("  events | articles");
    println!("  book <venue-id> <yyyy-mm-dd> <time slot...>   (signed-in)");
    println!("  bookings | booking <id>                       (signed-in)");
    println!("  teams | my-teams                              ");
    println!("  create-team <name>;<sport>[;<desc>]           (signed-in)");
    println!("  pending | approve <id> | cancel <id>          (admin)");
    println!("  add-venue <name>;<sport>;<address>;<price>    (admin)");
    println!("  open-venue <id> | close-venue <id>            (admin)");
    println!("  remove-venue <id>                             (admin)");
    println!("  grant-admin <user-id>                         (admin)");
    println!("  quit");
}

/// Evaluate a gate against the live session state, waiting out the loading
/// phase instead of rendering either outcome early
async fn pass(manager: &SessionManager, gate: &Gate) -> bool {
    let mut state = manager.subscribe();
    let mut waited = false;
    loop {
        let current = state.borrow_and_update().clone();
        match gate.check(&current) {
            Access::Grant => return true,
            Access::Redirect(_) => return false,
            Access::Loading => {
                if !waited {
                    println!("(waiting for session to resolve...)");
                    waited = true;
                }
                if state.changed().await.is_err() {
                    return false;
                }
            }
        }
    }
}

fn current_identity(app: &App) -> Option<Identity> {
    app.manager.current().identity().cloned()
}

async fn login(app: &App, args: &[&str]) {
    let &[email, password] = args else {
        println!("usage: login <email> <password>");
        return;
    };

    match app.manager.sign_in(email, password).await {
        Ok(()) => {
            // State propagates through the notification stream; wait for it
            // so the next prompt reflects the signed-in user.
            let mut state = app.manager.subscribe();
            let _ = tokio::time::timeout(std::time::Duration::from_secs(2), async {
                loop {
                    if state.borrow_and_update().identity().is_some() {
                        break;
                    }
                    if state.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await;
            println!("Signed in as {email}.");
        }
        Err(err) => println!("Sign-in failed: {err}"),
    }
}

async fn signup(app: &App, args: &[&str]) {
    if args.len() < 4 {
        println!("usage: signup <email> <password> <phone> <full name...>");
        return;
    }
    let (email, password, phone) = (args[0], args[1], args[2]);
    let full_name = args[3..].join(" ");

    for check in [
        validation::validate_email(email),
        validation::validate_password(password),
        validation::validate_phone(phone),
        validation::validate_display_name(&full_name),
    ] {
        if let Err(message) = check {
            println!("{message}");
            return;
        }
    }

    match app.manager.sign_up(email, password, &full_name, phone).await {
        Ok(()) => println!("Account created. Check your email to verify it."),
        Err(err) => println!("Sign-up failed: {err}"),
    }
}

async fn logout(app: &App) {
    app.manager.sign_out().await;
    println!("Signed out.");
}

async fn whoami(app: &App) {
    let state = app.manager.resolved().await;
    match state.identity() {
        Some(identity) => {
            let role = if state.is_admin() { "admin" } else { "member" };
            println!("{} ({role}, id {})", identity.email, identity.id);
        }
        None => println!("Not signed in."),
    }
}

async fn profile(app: &App) {
    if !pass(&app.manager, &Gate::authenticated()).await {
        println!("Please sign in first.");
        return;
    }
    let Some(identity) = current_identity(app) else {
        return;
    };

    match app.profiles.get(identity.id).await {
        Ok(Some(profile)) => {
            let name = [profile.first_name, profile.last_name]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            println!("Name:  {}", if name.is_empty() { "-".into() } else { name });
            println!("Email: {}", profile.email.as_deref().unwrap_or("-"));
            println!("Phone: {}", profile.phone.as_deref().unwrap_or("-"));
            println!("Admin: {}", profile.is_admin.unwrap_or(false));
        }
        Ok(None) => println!("No profile on record yet."),
        Err(err) => println!("Could not load profile: {err}"),
    }
}

async fn update_profile(app: &App, args: &[&str]) {
    if !pass(&app.manager, &Gate::authenticated()).await {
        println!("Please sign in first.");
        return;
    }
    let Some(identity) = current_identity(app) else {
        return;
    };

    let joined = args.join(" ");
    let fields: Vec<&str> = joined.split(';').map(str::trim).collect();
    let [first, last, phone] = fields.as_slice() else {
        println!("usage: update-profile <first>;<last>;<phone>");
        return;
    };
    if let Err(message) = validation::validate_phone(phone) {
        println!("{message}");
        return;
    }

    let changes = UpdateProfile {
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        phone: Some(phone.to_string()),
        ..UpdateProfile::default()
    };

    match app.profiles.update(identity.id, &changes).await {
        Ok(_) => println!("Profile updated."),
        Err(err) => println!("Could not update profile: {err}"),
    }
}

async fn venues(app: &App) {
    match app.venues.active().await {
        Ok(venues) if venues.is_empty() => println!("No venues listed right now."),
        Ok(venues) => {
            for venue in venues {
                println!("{}  {} [{}] {}", venue.id, venue.name, venue.sport, venue.price);
            }
        }
        Err(err) => println!("Could not load venues: {err}"),
    }
}

async fn search(app: &App, args: &[&str]) {
    if args.is_empty() {
        println!("usage: search <sport>");
        return;
    }
    let sport = args.join(" ");

    let query = TableQuery::new()
        .filter("status", FilterOp::Eq, VenueStatus::Active)
        .filter("sport", FilterOp::Ilike, format!("%{sport}%"))
        .order_by("name", true);

    match app.venues.list(&query).await {
        Ok(venues) if venues.is_empty() => println!("No venues found for `{sport}`."),
        Ok(venues) => {
            for venue in venues {
                println!("{}  {} [{}] {}", venue.id, venue.name, venue.sport, venue.price);
            }
        }
        Err(err) => println!("Search failed: {err}"),
    }
}

async fn venue(app: &App, args: &[&str]) {
    let Some(id) = parse_id(args.first()) else {
        println!("usage: venue <id>");
        return;
    };

    match app.venues.get(id).await {
        Ok(venue) => {
            println!("{} [{}]", venue.name, venue.sport);
            println!("Address: {}", venue.address);
            println!("Price:   {}", venue.price);
            if let Some(description) = &venue.description {
                println!("{description}");
            }
            if !venue.facilities.is_empty() {
                let names: Vec<&str> = venue
                    .facilities
                    .iter()
                    .filter(|f| f.available)
                    .map(|f| f.name.as_str())
                    .collect();
                println!("Facilities: {}", names.join(", "));
            }
            if !venue.time_slots.is_empty() {
                println!("Slots: {}", venue.time_slots.join(" | "));
            }
        }
        Err(err) => println!("Could not load venue: {err}"),
    }
}

async fn book(app: &App, args: &[&str]) {
    if !pass(&app.manager, &Gate::authenticated()).await {
        println!("Please sign in to book a venue.");
        return;
    }
    let Some(identity) = current_identity(app) else {
        return;
    };

    if args.len() < 3 {
        println!("usage: book <venue-id> <yyyy-mm-dd> <time slot...>");
        return;
    }
    let Some(venue_id) = parse_id(args.first()) else {
        println!("`{}` is not a venue id", args[0]);
        return;
    };
    let Ok(date) = args[1].parse::<NaiveDate>() else {
        println!("`{}` is not a date (expected yyyy-mm-dd)", args[1]);
        return;
    };
    let time_slot = args[2..].join(" ");

    let venue = match app.venues.get(venue_id).await {
        Ok(venue) => venue,
        Err(err) => {
            println!("Could not load venue: {err}");
            return;
        }
    };

    let booking = NewBooking {
        user_id: identity.id,
        venue_id: venue.id,
        date,
        time_slot,
        status: BookingStatus::Pending,
        amount: venue.price.clone(),
        notes: None,
    };

    match app.bookings.create(&booking).await {
        Ok(created) => println!(
            "Booked {} on {} ({}). Status: {}.",
            venue.name, created.date, created.time_slot, created.status
        ),
        Err(err) => println!("Booking failed: {err}"),
    }
}

async fn bookings(app: &App) {
    if !pass(&app.manager, &Gate::authenticated()).await {
        println!("Please sign in to see your bookings.");
        return;
    }
    let Some(identity) = current_identity(app) else {
        return;
    };

    match app.bookings.for_user(identity.id).await {
        Ok(bookings) if bookings.is_empty() => println!("No bookings yet."),
        Ok(bookings) => {
            for booking in bookings {
                println!(
                    "{}  {} {}  {}  {}",
                    booking.id, booking.date, booking.time_slot, booking.amount, booking.status
                );
            }
        }
        Err(err) => println!("Could not load bookings: {err}"),
    }
}

async fn booking(app: &App, args: &[&str]) {
    if !pass(&app.manager, &Gate::authenticated()).await {
        println!("Please sign in first.");
        return;
    }
    let Some(id) = parse_id(args.first()) else {
        println!("usage: booking <id>");
        return;
    };

    match app.bookings.get(id).await {
        Ok(booking) => {
            println!("Booking {}", booking.id);
            println!("Venue:  {}", booking.venue_id);
            println!("When:   {} {}", booking.date, booking.time_slot);
            println!("Amount: {}", booking.amount);
            println!("Status: {}", booking.status);
            if let Some(notes) = &booking.notes {
                println!("Notes:  {notes}");
            }
        }
        Err(err) => println!("Could not load booking: {err}"),
    }
}

async fn teams(app: &App) {
    match app.teams.list().await {
        Ok(teams) if teams.is_empty() => println!("No teams yet."),
        Ok(teams) => print_teams(&teams),
        Err(err) => println!("Could not load teams: {err}"),
    }
}

async fn my_teams(app: &App) {
    if !pass(&app.manager, &Gate::authenticated()).await {
        println!("Please sign in first.");
        return;
    }
    let Some(identity) = current_identity(app) else {
        return;
    };

    match app.teams.created_by(identity.id).await {
        Ok(teams) if teams.is_empty() => println!("You have not created any teams."),
        Ok(teams) => print_teams(&teams),
        Err(err) => println!("Could not load teams: {err}"),
    }
}

fn print_teams(teams: &[backend::models::Team]) {
    for team in teams {
        println!(
            "{}  {} [{}] {} member(s)",
            team.id,
            team.name,
            team.sport,
            team.members.len()
        );
    }
}

async fn create_team(app: &App, args: &[&str]) {
    if !pass(&app.manager, &Gate::authenticated()).await {
        println!("Please sign in to create a team.");
        return;
    }
    let Some(identity) = current_identity(app) else {
        return;
    };

    let joined = args.join(" ");
    let mut fields = joined.split(';').map(str::trim);
    let (Some(name), Some(sport)) = (fields.next(), fields.next()) else {
        println!("usage: create-team <name>;<sport>[;<description>]");
        return;
    };
    if name.is_empty() || sport.is_empty() {
        println!("usage: create-team <name>;<sport>[;<description>]");
        return;
    }

    let team = NewTeam {
        name: name.to_string(),
        sport: sport.to_string(),
        description: fields.next().map(str::to_string),
        image_url: None,
        created_by: identity.id,
        members: vec![identity.email],
    };

    match app.teams.create(&team).await {
        Ok(created) => println!("Team {} created.", created.name),
        Err(err) => println!("Could not create team: {err}"),
    }
}

async fn events(app: &App) {
    match app.events.featured(10).await {
        Ok(events) if events.is_empty() => println!("No events scheduled."),
        Ok(events) => {
            for event in events {
                println!("{}  {} @ {}", event.date, event.title, event.location);
            }
        }
        Err(err) => println!("Could not load events: {err}"),
    }
}

async fn articles(app: &App) {
    match app.articles.latest(10).await {
        Ok(articles) if articles.is_empty() => println!("No articles published."),
        Ok(articles) => {
            for article in articles {
                println!("{}  {} ({})", article.date, article.title, article.url);
            }
        }
        Err(err) => println!("Could not load articles: {err}"),
    }
}

async fn pending(app: &App) {
    if !pass(&app.manager, &Gate::administrator()).await {
        println!("Administrator access required.");
        return;
    }

    match app.bookings.with_status(BookingStatus::Pending).await {
        Ok(bookings) if bookings.is_empty() => println!("No pending bookings."),
        Ok(bookings) => {
            for booking in bookings {
                println!(
                    "{}  user {}  venue {}  {} {}",
                    booking.id, booking.user_id, booking.venue_id, booking.date, booking.time_slot
                );
            }
        }
        Err(err) => println!("Could not load pending bookings: {err}"),
    }
}

async fn set_booking_status(app: &App, args: &[&str], status: BookingStatus) {
    if !pass(&app.manager, &Gate::administrator()).await {
        println!("Administrator access required.");
        return;
    }
    let Some(id) = parse_id(args.first()) else {
        println!("usage: approve|cancel <booking-id>");
        return;
    };

    match app.bookings.set_status(id, status).await {
        Ok(booking) => println!("Booking {} is now {}.", booking.id, booking.status),
        Err(err) => println!("Could not update booking: {err}"),
    }
}

async fn add_venue(app: &App, args: &[&str]) {
    if !pass(&app.manager, &Gate::administrator()).await {
        println!("Administrator access required.");
        return;
    }

    let joined = args.join(" ");
    let fields: Vec<&str> = joined.split(';').map(str::trim).collect();
    let [name, sport, address, price] = fields.as_slice() else {
        println!("usage: add-venue <name>;<sport>;<address>;<price>");
        return;
    };

    let venue = NewVenue {
        name: name.to_string(),
        sport: sport.to_string(),
        address: address.to_string(),
        price: price.to_string(),
        description: None,
        image_url: None,
        facilities: Vec::new(),
        time_slots: Vec::new(),
        status: VenueStatus::Active,
    };

    match app.venues.create(&venue).await {
        Ok(created) => println!("Venue {} listed with id {}.", created.name, created.id),
        Err(err) => println!("Could not create venue: {err}"),
    }
}

async fn set_venue_status(app: &App, args: &[&str], status: VenueStatus) {
    if !pass(&app.manager, &Gate::administrator()).await {
        println!("Administrator access required.");
        return;
    }
    let Some(id) = parse_id(args.first()) else {
        println!("usage: open-venue|close-venue <venue-id>");
        return;
    };

    match app.venues.set_status(id, status).await {
        Ok(venue) => println!(
            "Venue {} is now {}.",
            venue.name,
            venue.status.map_or_else(|| "unknown".to_string(), |s| s.to_string())
        ),
        Err(err) => println!("Could not update venue: {err}"),
    }
}

async fn remove_venue(app: &App, args: &[&str]) {
    if !pass(&app.manager, &Gate::administrator()).await {
        println!("Administrator access required.");
        return;
    }
    let Some(id) = parse_id(args.first()) else {
        println!("usage: remove-venue <venue-id>");
        return;
    };

    match app.venues.delete(id).await {
        Ok(()) => println!("Venue removed."),
        Err(err) => println!("Could not remove venue: {err}"),
    }
}

async fn grant_admin(app: &App, args: &[&str]) {
    if !pass(&app.manager, &Gate::administrator()).await {
        println!("Administrator access required.");
        return;
    }
    let Some(id) = parse_id(args.first()) else {
        println!("usage: grant-admin <user-id>");
        return;
    };

    match app.profiles.set_admin(id, true).await {
        Ok(profile) => println!("{} is now an administrator.", profile.id),
        Err(err) => println!("Could not grant admin access: {err}"),
    }
}

fn parse_id(arg: Option<&&str>) -> Option<Uuid> {
    arg.and_then(|raw| Uuid::parse_str(raw).ok())
}
