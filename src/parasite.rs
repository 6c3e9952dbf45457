use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::agent::{Agent, AgentId};
use crate::constants::*;
use crate::species::SpeciesId;
use crate::timbre::{self, SoundProfile};
use crate::utils::{hash01, lerp, wrap_angle};
use crate::world::SimRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParasiteState {
    Hunting,
    Latched,
}

/// Last emitted phrase, kept for the other channels' call-and-response.
#[derive(Debug, Clone, Copy, Default)]
pub struct Phrase {
    pub amp: f32,
    pub hz: f32,
    pub t: f32,
}

/// What one parasite exposes to its peers each audio tick.
#[derive(Debug, Clone, Copy)]
pub struct PeerPhrase {
    pub host_pos: Option<Vec2>,
    pub phrase: Phrase,
}

/// One channel's synthesized control triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSignal {
    pub amp: f32,
    pub freq: f32,
    pub phase: f32,
}

#[derive(Debug, Clone)]
struct EchoTap {
    ttl: f32,
    age: f32,
    decay: f32,
    gain: f32,
}

/// One of exactly four persistent channel drivers. Never despawns; hunts
/// a living agent, latches, and converts host state into an
/// amplitude/frequency/phase triple. Holds its host as a non-owning id.
#[derive(Debug, Clone)]
pub struct Parasite {
    pub id: usize,
    pub pos: Vec2,
    pub heading: f32,
    pub state: ParasiteState,
    pub host: Option<AgentId>,
    pub last_phrase: Phrase,

    // Audio synthesis state
    phase: f32,
    note_hz: f32,
    target_hz: f32,
    hop_t: f32,
    talk_t: f32,
    echo_env: Vec<EchoTap>,
    last_click: f32,

    // Re-homing cooldowns to prevent host thrashing
    rehome_cooldown: f32,
    commit_left: f32,
}

struct Reply {
    hz: f32,
    amp: f32,
}

impl Parasite {
    pub fn new(id: usize, rng: &mut SimRng) -> Self {
        Self {
            id,
            pos: Vec2::new(rng.gen_range(0.3..0.7), rng.gen_range(0.3..0.7)),
            heading: rng.gen_range(0.0..TAU),
            state: ParasiteState::Hunting,
            host: None,
            last_phrase: Phrase::default(),
            phase: rng.gen_range(0.0..TAU),
            note_hz: 0.0,
            target_hz: 0.0,
            hop_t: rng.gen_range(0.12..0.5),
            talk_t: rng.gen_range(0.7..2.2),
            echo_env: Vec::new(),
            last_click: 0.0,
            rehome_cooldown: rng.gen_range(0.5..1.5),
            commit_left: 0.0,
        }
    }

    /// Releases the current host (clearing its occupied flag) and returns
    /// to hunting. Echo tails are purged so no sound leaks after detach.
    pub fn detach(&mut self, agents: &mut [Agent]) {
        if let Some(host_id) = self.host {
            if let Some(host) = agents.iter_mut().find(|a| a.id == host_id) {
                host.occupied = false;
            }
        }
        self.state = ParasiteState::Hunting;
        self.host = None;
        self.echo_env.clear();
    }

    /// Scatter back to a fresh hunting position (used by world init).
    pub fn reset_position(&mut self, rng: &mut SimRng) {
        self.pos = Vec2::new(rng.gen_range(0.3..0.7), rng.gen_range(0.3..0.7));
        self.heading = rng.gen_range(0.0..TAU);
    }

    /// Host desirability. Dead or invalid candidates score -inf-like so
    /// they can never win. `latched_species` is the per-channel snapshot
    /// of which species the other parasites currently ride.
    fn score_host(
        &self,
        candidate: &Agent,
        latched_species: &[Option<SpeciesId>; PARASITE_COUNT],
        rng: &mut SimRng,
    ) -> f32 {
        if !candidate.is_alive() {
            return INVALID_SCORE;
        }
        let d = self.pos.distance(candidate.pos);
        let dist_score = 1.0 / (0.02 + d);
        let energy = candidate.energy.clamp(0.0, 2.0);
        let feed_bonus = if candidate.feeding { 0.55 } else { 0.0 };

        let co_occupants = latched_species
            .iter()
            .enumerate()
            .filter(|&(i, s)| i != self.id && *s == Some(candidate.species))
            .count();
        let diversity = match co_occupants {
            0 => 0.35,
            1 => 0.12,
            _ => -0.10,
        };
        let noise = rng.gen_range(-0.025..0.025);

        dist_score * 1.15 + energy * 0.25 + feed_bonus + diversity + noise
    }

    pub fn step(
        &mut self,
        dt: f32,
        agents: &mut [Agent],
        latched_species: &[Option<SpeciesId>; PARASITE_COUNT],
        rng: &mut SimRng,
    ) {
        self.rehome_cooldown = (self.rehome_cooldown - dt).max(0.0);
        self.commit_left = (self.commit_left - dt).max(0.0);
        let can_switch = self.rehome_cooldown <= 0.0 && self.commit_left <= 0.0;

        if self.state == ParasiteState::Latched {
            let host_idx = self
                .host
                .and_then(|id| agents.iter().position(|a| a.id == id && a.is_alive()));
            let Some(hi) = host_idx else {
                // Host died or vanished mid-tick: detach with a short
                // refractory period before re-homing.
                self.detach(agents);
                self.rehome_cooldown = rng.gen_range(0.2..0.6);
                return;
            };

            // Stick to host (exponential approach, never teleport)
            self.pos = self.pos.lerp(agents[hi].pos, 0.12);

            if can_switch {
                let current = self.score_host(&agents[hi], latched_species, rng);
                let mut best: Option<usize> = None;
                let mut best_score = current;
                for (j, a) in agents.iter().enumerate() {
                    if !a.is_alive() {
                        continue;
                    }
                    if a.occupied && j != hi {
                        continue;
                    }
                    if self.pos.distance(a.pos) > REHOME_RADIUS {
                        continue;
                    }
                    let s = self.score_host(a, latched_species, rng);
                    if s > best_score {
                        best_score = s;
                        best = Some(j);
                    }
                }
                // Hysteresis margin avoids constant swapping
                match best {
                    Some(j) if j != hi && best_score > current + SWITCH_MARGIN => {
                        agents[hi].occupied = false;
                        agents[j].occupied = true;
                        self.host = Some(agents[j].id);
                        self.commit_left = rng.gen_range(0.8..2.0);
                        self.rehome_cooldown = rng.gen_range(0.6..1.6);
                    }
                    _ => {
                        // Don't rescore every frame
                        self.rehome_cooldown = rng.gen_range(0.25..0.6);
                    }
                }
            }
            self.pos = self.pos.clamp(Vec2::ZERO, Vec2::ONE);
            return;
        }

        // Hunting: widest scan over alive, unoccupied agents
        self.host = None;
        let mut best: Option<usize> = None;
        let mut best_score = INVALID_SCORE;
        for (j, a) in agents.iter().enumerate() {
            if !a.is_alive() || a.occupied {
                continue;
            }
            if self.pos.distance(a.pos) > HUNT_RADIUS {
                continue;
            }
            let s = self.score_host(a, latched_species, rng);
            if s > best_score {
                best_score = s;
                best = Some(j);
            }
        }

        if let Some(j) = best {
            let to = agents[j].pos - self.pos;
            let target = to.y.atan2(to.x);
            self.heading += wrap_angle(target - self.heading) * 0.05;
            self.pos += Vec2::from_angle(self.heading) * 0.003;
            if self.pos.distance(agents[j].pos) < CAPTURE_RADIUS {
                self.state = ParasiteState::Latched;
                self.host = Some(agents[j].id);
                agents[j].occupied = true;
                self.commit_left = rng.gen_range(0.8..2.0);
                self.rehome_cooldown = rng.gen_range(0.4..1.0);
            }
        } else {
            self.pos += Vec2::new(
                rng.gen_range(-0.0005..0.0005),
                rng.gen_range(-0.0005..0.0005),
            );
        }
        self.pos = self.pos.clamp(Vec2::ZERO, Vec2::ONE);
    }

    /// Snapshot for the other channels' call-and-response lookups.
    pub fn peer_phrase(&self, agents: &[Agent]) -> PeerPhrase {
        let host_pos = match self.state {
            ParasiteState::Latched => self
                .host
                .and_then(|id| agents.iter().find(|a| a.id == id && a.is_alive()))
                .map(|a| a.pos),
            ParasiteState::Hunting => None,
        };
        PeerPhrase {
            host_pos,
            phrase: self.last_phrase,
        }
    }

    fn trigger_echo(&mut self, lib: &SoundProfile, amp: f32) {
        for &(tap, gain) in lib.echo {
            self.echo_env.push(EchoTap {
                ttl: tap,
                age: 0.0,
                decay: (tap * 0.7).max(0.03),
                gain: gain * amp,
            });
        }
    }

    fn apply_echo(&mut self, dt: f32) -> f32 {
        let mut add = 0.0;
        for env in &mut self.echo_env {
            env.ttl -= dt;
            env.age += dt;
            if env.ttl > 0.0 {
                add += env.gain * (-env.age / env.decay).exp();
            }
        }
        self.echo_env.retain(|e| e.ttl > 0.0);
        add
    }

    /// Periodically answers the nearest other latched channel: if its host
    /// is close on the body and it recently spoke, pull our pitch toward a
    /// ratio of that phrase.
    fn call_and_response(
        &mut self,
        t: f32,
        dt: f32,
        host: &Agent,
        lib: &SoundProfile,
        f_base: f32,
        peers: &[PeerPhrase; PARASITE_COUNT],
        rng: &mut SimRng,
    ) -> Option<Reply> {
        self.talk_t -= dt;
        if self.talk_t > 0.0 {
            return None;
        }
        self.talk_t = rng.gen_range(0.7..2.5) / lib.talkiness.max(0.15);

        let mut best: Option<&PeerPhrase> = None;
        let mut best_dist = f32::INFINITY;
        for (i, peer) in peers.iter().enumerate() {
            if i == self.id {
                continue;
            }
            let Some(peer_pos) = peer.host_pos else {
                continue;
            };
            let d = host.pos.distance(peer_pos);
            if d < best_dist {
                best_dist = d;
                best = Some(peer);
            }
        }
        let peer = best.filter(|_| best_dist <= CALL_RADIUS)?;
        let phrase = peer.phrase;
        if phrase.amp <= 0.02 || phrase.hz <= 0.0 {
            return None;
        }

        let s01 = hash01(self.id as f32 * 17.13 + t * 0.23 + host.seed);
        let ratio = pick_ratio(lib.ratios, s01);
        let hz = (phrase.hz * ratio).clamp(f_base * lib.min_mul, f_base * lib.max_mul);
        let amp = (phrase.amp * rng.gen_range(0.45..0.85)).clamp(0.0, 1.0);
        Some(Reply { hz, amp })
    }

    /// Synthesizes this channel's (amplitude, frequency, phase) triple.
    /// Strict gate: an unlatched parasite emits exactly zero amplitude
    /// while its idle phase keeps advancing at the channel base rate.
    pub fn audio(
        &mut self,
        t: f32,
        dt: f32,
        base_hz: f32,
        ch_mult: &[f32; PARASITE_COUNT],
        agents: &[Agent],
        peers: &[PeerPhrase; PARASITE_COUNT],
        rng: &mut SimRng,
    ) -> ChannelSignal {
        let f_base = base_hz * ch_mult[self.id];

        let host = match self.state {
            ParasiteState::Latched => self
                .host
                .and_then(|id| agents.iter().find(|a| a.id == id && a.is_alive())),
            ParasiteState::Hunting => None,
        };
        let Some(host) = host else {
            self.phase = (self.phase + TAU * f_base * dt).rem_euclid(TAU);
            self.echo_env.clear();
            return ChannelSignal {
                amp: 0.0,
                freq: f_base,
                phase: self.phase,
            };
        };

        let lib = timbre::profile(host.species);
        let speed_n = (host.vel.length() / SPEED_NORM).clamp(0.0, 1.0);
        let energy = host.energy.clamp(0.0, 2.0);
        let e1 = energy.clamp(0.0, 1.0);

        // Dynamic range between a whisper floor and a yell ceiling
        let whisper = 0.04 + 0.18 * e1;
        let yell = 0.35 + 0.75 * (0.35 * speed_n + 0.65 * e1);
        let dyn_level = lerp(whisper, yell, e1);

        // Hop to a new target pitch on a speed-scaled timer. Ratio choice
        // is a pure hash of (host identity, time, channel) so it replays
        // identically for the same inputs.
        self.hop_t -= dt;
        if self.hop_t <= 0.0 {
            let hop_rate = lerp(lib.hop_hz[0], lib.hop_hz[2], 0.25 + 0.75 * speed_n);
            self.hop_t = rng.gen_range(0.12..0.55) / hop_rate.max(0.25);
            let s01 = hash01(host.seed * 19.7 + t * 0.35 + self.id as f32 * 3.1);
            let ratio = pick_ratio(lib.ratios, s01);
            self.target_hz =
                (f_base * ratio * lib.reg_mul).clamp(f_base * lib.min_mul, f_base * lib.max_mul);
            if rng.gen_bool(0.45) {
                self.trigger_echo(lib, dyn_level.clamp(0.0, 1.0));
            }
        }

        if let Some(reply) = self.call_and_response(t, dt, host, lib, f_base, peers, rng) {
            let from = if self.target_hz > 0.0 { self.target_hz } else { f_base };
            self.target_hz = lerp(from, reply.hz, 0.65);
            self.trigger_echo(lib, reply.amp);
        }

        if !self.note_hz.is_finite() || self.note_hz <= 0.0 {
            self.note_hz = if self.target_hz > 0.0 { self.target_hz } else { f_base };
        }
        let glide_to = if self.target_hz > 0.0 { self.target_hz } else { f_base };
        self.note_hz = lerp(self.note_hz, glide_to, 0.06 + 0.16 * speed_n);

        let vib_hz = lerp(lib.vibrato_hz[0], lib.vibrato_hz[1], 0.25 + 0.75 * speed_n);
        let vib_amt = lerp(lib.vibrato_amt[0], lib.vibrato_amt[1], 0.15 + 0.85 * e1);
        let vibrato = 1.0 + (t * TAU * vib_hz + host.seed).sin() * vib_amt;

        let gate = timbre::gate_for(lib, t, speed_n, host.seed + self.id as f32 * 11.7);
        let mut amp = dyn_level * gate * energy.clamp(0.0, 1.5);
        amp += self.apply_echo(dt);

        let jitter = rng.gen_range(-0.5..0.5) * lib.grit * (0.35 + 0.65 * speed_n);
        // Percussive timbres snap their oscillator on gate peaks
        if lib.phase_reset && gate > 1.0 && (t - self.last_click) > 0.06 {
            self.last_click = t;
            self.phase = rng.gen_range(0.0..TAU);
        }

        let freq = self.note_hz * vibrato;
        self.phase = (self.phase + TAU * freq * dt + jitter).rem_euclid(TAU);
        let amp = (amp * energy).clamp(0.0, 1.0);
        self.last_phrase = Phrase { amp, hz: freq, t };

        ChannelSignal {
            amp,
            freq,
            phase: self.phase,
        }
    }
}

fn pick_ratio(ratios: &[f32], s01: f32) -> f32 {
    let idx = (s01.clamp(0.0, 0.999_999) * ratios.len() as f32) as usize;
    ratios[idx.min(ratios.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> SimRng {
        SimRng::seed_from_u64(11)
    }

    fn idle_peers() -> [PeerPhrase; PARASITE_COUNT] {
        [PeerPhrase {
            host_pos: None,
            phrase: Phrase::default(),
        }; PARASITE_COUNT]
    }

    fn adult(id: AgentId, species: SpeciesId, pos: Vec2, r: &mut SimRng) -> Agent {
        Agent::new(id, species, pos, false, r)
    }

    #[test]
    fn hunting_parasite_is_strictly_silent() {
        let mut r = rng();
        let mut p = Parasite::new(0, &mut r);
        let peers = idle_peers();
        let mut last_phase = None;
        for i in 0..50 {
            let sig = p.audio(
                i as f32 * 0.016,
                0.016,
                200.0,
                &[1.0, 2.0, 3.0, 4.0],
                &[],
                &peers,
                &mut r,
            );
            assert_eq!(sig.amp, 0.0);
            assert_eq!(sig.freq, 200.0);
            // Idle phase still advances
            if let Some(prev) = last_phase {
                assert_ne!(sig.phase, prev);
            }
            last_phase = Some(sig.phase);
        }
    }

    #[test]
    fn latches_on_contact_and_claims_occupancy() {
        let mut r = rng();
        let mut p = Parasite::new(0, &mut r);
        let mut agents = vec![adult(7, SpeciesId::Bacteria, Vec2::splat(0.5), &mut r)];
        p.pos = Vec2::splat(0.5);
        let latched = [None; PARASITE_COUNT];
        p.step(0.016, &mut agents, &latched, &mut r);
        assert_eq!(p.state, ParasiteState::Latched);
        assert_eq!(p.host, Some(7));
        assert!(agents[0].occupied);
    }

    #[test]
    fn detaches_when_host_is_no_longer_alive() {
        let mut r = rng();
        let mut p = Parasite::new(1, &mut r);
        let mut agents = vec![adult(9, SpeciesId::Flagellate, Vec2::splat(0.4), &mut r)];
        p.pos = Vec2::splat(0.4);
        let latched = [None; PARASITE_COUNT];
        p.step(0.016, &mut agents, &latched, &mut r);
        assert_eq!(p.state, ParasiteState::Latched);

        agents[0].state = crate::agent::LifeState::Dying;
        p.step(0.016, &mut agents, &latched, &mut r);
        assert_eq!(p.state, ParasiteState::Hunting);
        assert_eq!(p.host, None);
        assert!(!agents[0].occupied);

        // And the very next audio call reports silence
        let sig = p.audio(
            1.0,
            0.016,
            200.0,
            &[1.0, 2.0, 3.0, 4.0],
            &agents,
            &idle_peers(),
            &mut r,
        );
        assert_eq!(sig.amp, 0.0);
    }

    #[test]
    fn latched_audio_is_bounded_and_records_phrases() {
        let mut r = rng();
        let mut p = Parasite::new(2, &mut r);
        let mut agents = vec![adult(3, SpeciesId::Archaea, Vec2::splat(0.6), &mut r)];
        agents[0].vel = Vec2::new(0.0001, 0.0001);
        p.pos = Vec2::splat(0.6);
        let latched = [None; PARASITE_COUNT];
        p.step(0.016, &mut agents, &latched, &mut r);
        assert_eq!(p.state, ParasiteState::Latched);

        let peers = idle_peers();
        let mut t = 0.0;
        for _ in 0..400 {
            t += 0.016;
            let sig = p.audio(t, 0.016, 200.0, &[1.0, 2.0, 3.0, 4.0], &agents, &peers, &mut r);
            assert!((0.0..=1.0).contains(&sig.amp), "amp {} out of range", sig.amp);
            assert!(sig.freq > 0.0 && sig.freq.is_finite());
            assert!((0.0..TAU + 1e-4).contains(&sig.phase));
        }
        assert!(p.last_phrase.hz > 0.0);
    }

    #[test]
    fn dead_candidates_never_win_scoring() {
        let mut r = rng();
        let p = Parasite::new(0, &mut r);
        let mut a = adult(5, SpeciesId::Lattice, Vec2::splat(0.5), &mut r);
        a.state = crate::agent::LifeState::Dead;
        let latched = [None; PARASITE_COUNT];
        assert_eq!(p.score_host(&a, &latched, &mut r), INVALID_SCORE);
    }

    #[test]
    fn position_stays_in_field_while_wandering() {
        let mut r = rng();
        let mut p = Parasite::new(3, &mut r);
        p.pos = Vec2::new(0.999, 0.001);
        let latched = [None; PARASITE_COUNT];
        for _ in 0..500 {
            p.step(0.016, &mut [], &latched, &mut r);
            assert!((0.0..=1.0).contains(&p.pos.x));
            assert!((0.0..=1.0).contains(&p.pos.y));
        }
    }
}
