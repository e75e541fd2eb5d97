//! Session commands.

use clap::Subcommand;

use marigold_client::types::{Credentials, Registration};

use super::context::Context;
use super::CliError;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        name: String,
    },
    /// Show the signed-in user
    Whoami,
    /// Sign out
    Logout,
}

pub async fn run(ctx: &Context, action: AuthAction) -> Result<(), CliError> {
    match action {
        AuthAction::Login { email, password } => {
            let signed_in = ctx.auth.login(&Credentials { email, password }).await;
            if signed_in {
                print_user(ctx);
            }
        }
        AuthAction::Register {
            email,
            password,
            name,
        } => {
            let signed_in = ctx
                .auth
                .register(&Registration {
                    email,
                    password,
                    name,
                })
                .await;
            if signed_in {
                print_user(ctx);
            }
        }
        AuthAction::Whoami => {
            ctx.auth.fetch_user().await;
            print_user(ctx);
        }
        AuthAction::Logout => {
            ctx.auth.logout();
            println!("Signed out");
        }
    }
    Ok(())
}

fn print_user(ctx: &Context) {
    match ctx.auth.state().user {
        Some(user) => println!("{}  {}  {}  ({})", user.id, user.name, user.email, user.role),
        None => println!("Not signed in"),
    }
}
