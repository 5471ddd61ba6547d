use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{MessageModel, MessageTarget, NewMessage, MAX_CONTENT_CHARS},
    repository::MessageRepository,
    types::{MessageResponse, MessageSender},
};
use crate::{
    matches::{
        models::{MatchId, MatchModel},
        repository::MatchRepository,
    },
    shared::AppError,
    tournament::{
        models::{TournamentId, TournamentModel},
        repository::TournamentRepository,
    },
    user::{
        models::{Role, UserId, UserModel},
        repository::UserRepository,
        UserService,
    },
};

/// Poll-based chat for tournaments and matches.
///
/// Only roster players (tournament chat), the two match players (match chat)
/// or an admin may post or read.
pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
    tournaments: Arc<dyn TournamentRepository>,
    matches: Arc<dyn MatchRepository>,
    user_repository: Arc<dyn UserRepository>,
}

impl MessageService {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        tournaments: Arc<dyn TournamentRepository>,
        matches: Arc<dyn MatchRepository>,
        user_repository: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            messages,
            tournaments,
            matches,
            user_repository,
        }
    }

    #[instrument(skip(self, content))]
    pub async fn send_tournament_message(
        &self,
        tournament_id: TournamentId,
        sender_id: UserId,
        content: String,
    ) -> Result<MessageResponse, AppError> {
        validate_content(&content)?;
        let sender = self.load_sender(sender_id).await?;
        let tournament = self.load_tournament(tournament_id).await?;

        if !may_use_tournament_chat(&tournament, &sender) {
            warn!(tournament_id = tournament_id, user_id = sender_id, "Tournament chat post denied");
            return Err(AppError::Forbidden(
                "Only tournament players or an admin can post in this chat".to_string(),
            ));
        }

        self.post(&sender, content, MessageTarget::Tournament(tournament_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_tournament_messages(
        &self,
        tournament_id: TournamentId,
        reader_id: UserId,
    ) -> Result<Vec<MessageResponse>, AppError> {
        let reader = self.load_reader(reader_id).await?;
        let tournament = self.load_tournament(tournament_id).await?;

        if !may_use_tournament_chat(&tournament, &reader) {
            warn!(tournament_id = tournament_id, user_id = reader_id, "Tournament chat read denied");
            return Err(AppError::Forbidden(
                "Only tournament players or an admin can read this chat".to_string(),
            ));
        }

        let messages = self.messages.find_messages_by_tournament(tournament_id).await?;
        self.to_responses(messages).await
    }

    #[instrument(skip(self, content))]
    pub async fn send_match_message(
        &self,
        match_id: MatchId,
        sender_id: UserId,
        content: String,
    ) -> Result<MessageResponse, AppError> {
        validate_content(&content)?;
        let sender = self.load_sender(sender_id).await?;
        let found = self.load_match(match_id).await?;

        if !may_use_match_chat(&found, &sender) {
            warn!(match_id = match_id, user_id = sender_id, "Match chat post denied");
            return Err(AppError::Forbidden(
                "Only the match players or an admin can post in this chat".to_string(),
            ));
        }

        self.post(&sender, content, MessageTarget::Match(match_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_match_messages(
        &self,
        match_id: MatchId,
        reader_id: UserId,
    ) -> Result<Vec<MessageResponse>, AppError> {
        let reader = self.load_reader(reader_id).await?;
        let found = self.load_match(match_id).await?;

        if !may_use_match_chat(&found, &reader) {
            warn!(match_id = match_id, user_id = reader_id, "Match chat read denied");
            return Err(AppError::Forbidden(
                "Only the match players or an admin can read this chat".to_string(),
            ));
        }

        let messages = self.messages.find_messages_by_match(match_id).await?;
        self.to_responses(messages).await
    }

    async fn post(
        &self,
        sender: &UserModel,
        content: String,
        target: MessageTarget,
    ) -> Result<MessageResponse, AppError> {
        let saved = self
            .messages
            .create_message(&NewMessage {
                sender_id: sender.id,
                content,
                target,
            })
            .await?;

        info!(message_id = saved.id, sender_id = sender.id, chat = ?target, "Chat message posted");
        Ok(MessageResponse {
            id: saved.id,
            sender: MessageSender::from(sender),
            content: saved.content,
            sent_at: saved.sent_at,
        })
    }

    async fn load_sender(&self, sender_id: UserId) -> Result<UserModel, AppError> {
        self.user_repository
            .find_user_by_id(sender_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sender {} not found", sender_id)))
    }

    async fn load_reader(&self, reader_id: UserId) -> Result<UserModel, AppError> {
        self.user_repository
            .find_user_by_id(reader_id)
            .await?
            .ok_or_else(|| AppError::Forbidden(format!("User {} is not registered", reader_id)))
    }

    async fn load_tournament(&self, tournament_id: TournamentId) -> Result<TournamentModel, AppError> {
        self.tournaments
            .find_tournament_by_id(tournament_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tournament {} not found", tournament_id)))
    }

    async fn load_match(&self, match_id: MatchId) -> Result<MatchModel, AppError> {
        self.matches
            .find_match_by_id(match_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Match {} not found", match_id)))
    }

    async fn to_responses(&self, messages: Vec<MessageModel>) -> Result<Vec<MessageResponse>, AppError> {
        let mut ids: Vec<UserId> = messages.iter().map(|m| m.sender_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let directory = UserService::new(Arc::clone(&self.user_repository))
            .directory(&ids)
            .await?;
        debug!(message_count = messages.len(), "Chat messages loaded");

        Ok(messages
            .into_iter()
            .map(|m| MessageResponse {
                id: m.id,
                sender: MessageSender::from(&directory[&m.sender_id]),
                content: m.content,
                sent_at: m.sent_at,
            })
            .collect())
    }
}

fn validate_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::InvalidArgument(
            "Message content must not be blank".to_string(),
        ));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::InvalidArgument(format!(
            "Message content cannot exceed {} characters",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(())
}

fn may_use_tournament_chat(tournament: &TournamentModel, user: &UserModel) -> bool {
    user.role == Role::Admin || tournament.has_player(user.id)
}

fn may_use_match_chat(found: &MatchModel, user: &UserModel) -> bool {
    user.role == Role::Admin || found.involves(user.id)
}
