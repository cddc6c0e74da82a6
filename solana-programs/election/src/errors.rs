use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Election has already closed")]
    AlreadyClosed,
    #[msg("Not enough amount for registration fee.")]
    InsufficientFee,
    #[msg("Voter is already registered.")]
    AlreadyRegistered,
    #[msg("Voter is not registered")]
    VoterNotRegistered,
    #[msg("Candidate is not registered")]
    CandidateNotRegistered,
    #[msg("Voter has already voted")]
    AlreadyVoted,
    #[msg("Unauthorized")]
    Unauthorized,
    #[msg("an election needs at least one candidate")]
    NoCandidates,
    #[msg("candidate listed more than once")]
    DuplicateCandidate,
    #[msg("candidate list exceeds account capacity")]
    TooManyCandidates,
    #[msg("escrow or tally overflowed")]
    ArithmeticOverflow,
}
