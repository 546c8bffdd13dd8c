//! Bullets and mines.
//!
//! Bullets travel in straight lines and are collision-checked as the
//! segment they swept this tick, against actor boxes after movement and
//! against other bullets' segments. Mines sit where they were placed, arm
//! one tick later, and detonate on contact with any actor, their owner
//! included.
//!
//! Damage is applied here and scored here; deaths are left for the
//! scheduler to notice, except that kill bonuses must be credited at the
//! damage site because they depend on the per-victim damage ledger.

use glam::DVec2;
use ironclash_api::events::{
    Event, HitByProjectileEvent, ProjectileHitEvent, ProjectileHitProjectileEvent,
    ProjectileMissedEvent, ProjectileKind,
};
use ironclash_api::rules::{
    bullet_damage, bullet_energy_bonus, bullet_speed, gun_heat, mine_damage, mine_energy_bonus,
    normal_relative_angle, EXPLOSION_FRAMES, MAX_BULLET_POWER, MAX_MINE_POWER, MINE_RADIUS,
    MIN_BULLET_POWER, MIN_MINE_POWER,
};
use std::f64::consts::PI;
use tracing::debug;

use crate::actor::{ActorCell, ActorId};
use crate::field::{BattleField, BoundingBox};
use crate::physics::pair_mut;
use crate::score::ScoreBoard;
use crate::snapshot::{BulletSnapshot, MineSnapshot};

/// Bullet lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BulletState {
    Moving,
    Exploding,
    Inactive,
}

/// A bullet in flight.
#[derive(Debug, Clone)]
struct Bullet {
    owner: ActorId,
    owner_name: String,
    power: f64,
    position: DVec2,
    last_position: DVec2,
    heading: f64,
    state: BulletState,
    frame: u32,
}

impl Bullet {
    fn speed(&self) -> f64 {
        bullet_speed(self.power)
    }
}

/// Mine lifecycle. A mine spends one tick unarmed so its owner can clear
/// the blast radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MineState {
    Placed,
    Armed,
    Exploding,
    Inactive,
}

/// A placed mine.
#[derive(Debug, Clone)]
struct Mine {
    owner: ActorId,
    owner_name: String,
    power: f64,
    position: DVec2,
    state: MineState,
    frame: u32,
}

impl Mine {
    fn trigger_box(&self) -> BoundingBox {
        BoundingBox::centered(self.position, MINE_RADIUS * 2.0)
    }
}

/// Owns every projectile in the round.
#[derive(Debug, Default)]
pub struct ProjectileEngine {
    bullets: Vec<Bullet>,
    mines: Vec<Mine>,
}

impl ProjectileEngine {
    /// Empty engine for a fresh round.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every projectile. Called between rounds.
    pub fn clear(&mut self) {
        self.bullets.clear();
        self.mines.clear();
    }

    /// Attempts to fire the actor's pending shot. A non-positive request is
    /// refused outright; otherwise the shot is refused while the gun is hot
    /// or the actor has no energy, and power is clamped to the legal range
    /// and to the actor's remaining energy, so firing can never kill the
    /// shooter.
    pub fn fire(&mut self, cell: &mut ActorCell) {
        let Some(requested) = cell.pending_fire.take() else {
            return;
        };
        if requested <= 0.0 {
            debug!(actor = %cell.name, power = requested, "shot refused, non-positive power");
            return;
        }
        if cell.gun_heat > 0.0 || cell.energy <= 0.0 {
            debug!(actor = %cell.name, gun_heat = cell.gun_heat, "shot refused");
            return;
        }
        let power = requested
            .clamp(MIN_BULLET_POWER, MAX_BULLET_POWER)
            .min(cell.energy);
        cell.energy -= power;
        cell.gun_heat += gun_heat(power);
        self.bullets.push(Bullet {
            owner: cell.id,
            owner_name: cell.name.clone(),
            power,
            position: cell.position,
            last_position: cell.position,
            heading: cell.gun_heading,
            state: BulletState::Moving,
            frame: 0,
        });
    }

    /// Attempts to place the actor's pending mine at its current position.
    /// A non-positive request is refused outright; otherwise the mine's
    /// power is drawn from the actor's energy, clamped so placement can
    /// never kill the owner.
    pub fn place_mine(&mut self, cell: &mut ActorCell) {
        let Some(requested) = cell.pending_mine.take() else {
            return;
        };
        if requested <= 0.0 {
            debug!(actor = %cell.name, power = requested, "mine refused, non-positive power");
            return;
        }
        if cell.energy <= 0.0 {
            return;
        }
        let power = requested
            .clamp(MIN_MINE_POWER, MAX_MINE_POWER)
            .min(cell.energy);
        if power < MIN_MINE_POWER {
            debug!(actor = %cell.name, energy = cell.energy, "mine refused, energy too low");
            return;
        }
        cell.energy -= power;
        self.mines.push(Mine {
            owner: cell.id,
            owner_name: cell.name.clone(),
            power,
            position: cell.position,
            state: MineState::Placed,
            frame: 0,
        });
    }

    /// Advances every projectile one tick: movement, collisions, damage,
    /// scoring, explosion frames, reaping.
    pub fn update(
        &mut self,
        cells: &mut [ActorCell],
        field: &BattleField,
        scores: &mut ScoreBoard,
    ) {
        self.move_bullets();
        self.check_bullet_vs_bullet(cells);
        self.check_bullet_hits(cells, scores);
        self.check_bullet_walls(cells, field);
        self.arm_and_trigger_mines(cells, scores);
        self.advance_explosions();
    }

    fn move_bullets(&mut self) {
        for b in &mut self.bullets {
            if b.state == BulletState::Moving {
                b.last_position = b.position;
                let speed = b.speed();
                b.position.x += speed * b.heading.sin();
                b.position.y += speed * b.heading.cos();
            }
        }
    }

    fn check_bullet_vs_bullet(&mut self, cells: &mut [ActorCell]) {
        for i in 0..self.bullets.len() {
            for j in (i + 1)..self.bullets.len() {
                if self.bullets[i].state != BulletState::Moving
                    || self.bullets[j].state != BulletState::Moving
                {
                    continue;
                }
                let (a, b) = (&self.bullets[i], &self.bullets[j]);
                if !segments_intersect(a.last_position, a.position, b.last_position, b.position) {
                    continue;
                }
                let (a_owner, a_other) = (a.owner, b.owner_name.clone());
                let (b_owner, b_other) = (b.owner, a.owner_name.clone());
                self.bullets[i].state = BulletState::Exploding;
                self.bullets[j].state = BulletState::Exploding;
                push_event(
                    cells,
                    a_owner,
                    Event::ProjectileHitProjectile(ProjectileHitProjectileEvent {
                        kind: ProjectileKind::Bullet,
                        other_owner: a_other,
                    }),
                );
                push_event(
                    cells,
                    b_owner,
                    Event::ProjectileHitProjectile(ProjectileHitProjectileEvent {
                        kind: ProjectileKind::Bullet,
                        other_owner: b_other,
                    }),
                );
            }
        }
    }

    fn check_bullet_hits(&mut self, cells: &mut [ActorCell], scores: &mut ScoreBoard) {
        for b in &mut self.bullets {
            if b.state != BulletState::Moving {
                continue;
            }
            let hit_index = cells.iter().position(|c| {
                c.is_alive()
                    && c.id != b.owner
                    && c.bounding_box().intersects_segment(b.last_position, b.position)
            });
            let Some(victim_idx) = hit_index else {
                continue;
            };
            b.state = BulletState::Exploding;
            let damage = bullet_damage(b.power);
            let owner_idx = b.owner.0 as usize;

            let (victim_name, victim_energy, victim_killed) = {
                let victim = &mut cells[victim_idx];
                let bearing =
                    normal_relative_angle(PI + b.heading - victim.body_heading);
                let killed = victim.damage(damage);
                victim.outbox.push(Event::HitByProjectile(HitByProjectileEvent {
                    kind: ProjectileKind::Bullet,
                    owner: b.owner_name.clone(),
                    power: b.power,
                    bearing,
                }));
                (victim.name.clone(), victim.energy, killed)
            };

            let scored = if owner_idx < cells.len() {
                let (owner, victim) = pair_mut(cells, owner_idx, victim_idx);
                if owner.is_alive() {
                    owner.energy += bullet_energy_bonus(b.power);
                }
                owner.outbox.push(Event::ProjectileHit(ProjectileHitEvent {
                    kind: ProjectileKind::Bullet,
                    victim: victim_name,
                    damage,
                    victim_energy,
                }));
                !owner.is_teammate(victim)
                    && owner.kind.is_contestant()
                    && victim.kind.is_contestant()
            } else {
                false
            };
            if scored {
                scores.projectile_damage(b.owner, cells[victim_idx].id, damage);
                if victim_killed {
                    scores.kill(b.owner, cells[victim_idx].id, false);
                }
            }
        }
    }

    fn check_bullet_walls(&mut self, cells: &mut [ActorCell], field: &BattleField) {
        for b in &mut self.bullets {
            if b.state == BulletState::Moving && !field.contains(b.position) {
                b.state = BulletState::Inactive;
                push_event(
                    cells,
                    b.owner,
                    Event::ProjectileMissed(ProjectileMissedEvent {
                        kind: ProjectileKind::Bullet,
                    }),
                );
            }
        }
    }

    fn arm_and_trigger_mines(&mut self, cells: &mut [ActorCell], scores: &mut ScoreBoard) {
        // Mutual detonation of armed mines in each other's blast radius.
        for i in 0..self.mines.len() {
            for j in (i + 1)..self.mines.len() {
                if self.mines[i].state != MineState::Armed
                    || self.mines[j].state != MineState::Armed
                {
                    continue;
                }
                let close = self.mines[i]
                    .position
                    .distance(self.mines[j].position)
                    <= MINE_RADIUS * 2.0;
                if !close {
                    continue;
                }
                let (a_owner, a_other) = (self.mines[i].owner, self.mines[j].owner_name.clone());
                let (b_owner, b_other) = (self.mines[j].owner, self.mines[i].owner_name.clone());
                self.mines[i].state = MineState::Exploding;
                self.mines[j].state = MineState::Exploding;
                push_event(
                    cells,
                    a_owner,
                    Event::ProjectileHitProjectile(ProjectileHitProjectileEvent {
                        kind: ProjectileKind::Mine,
                        other_owner: a_other,
                    }),
                );
                push_event(
                    cells,
                    b_owner,
                    Event::ProjectileHitProjectile(ProjectileHitProjectileEvent {
                        kind: ProjectileKind::Mine,
                        other_owner: b_other,
                    }),
                );
            }
        }

        for m in &mut self.mines {
            match m.state {
                MineState::Placed => {
                    m.state = MineState::Armed;
                }
                MineState::Armed => {
                    let hit_index = cells.iter().position(|c| {
                        c.is_alive() && c.bounding_box().intersects(&m.trigger_box())
                    });
                    let Some(victim_idx) = hit_index else {
                        continue;
                    };
                    m.state = MineState::Exploding;
                    let damage = mine_damage(m.power);
                    let owner_idx = m.owner.0 as usize;
                    let self_hit = cells[victim_idx].id == m.owner;

                    let (victim_name, victim_energy, victim_killed) = {
                        let victim = &mut cells[victim_idx];
                        let to_mine = m.position - victim.position;
                        let bearing = normal_relative_angle(
                            to_mine.x.atan2(to_mine.y) - victim.body_heading,
                        );
                        let killed = victim.damage(damage);
                        victim
                            .outbox
                            .push(Event::HitByProjectile(HitByProjectileEvent {
                                kind: ProjectileKind::Mine,
                                owner: m.owner_name.clone(),
                                power: m.power,
                                bearing,
                            }));
                        (victim.name.clone(), victim.energy, killed)
                    };

                    if self_hit {
                        // No bonus and no score for stepping on your own
                        // mine; the hit event above is all you get.
                        continue;
                    }
                    let scored = if owner_idx < cells.len() {
                        let (owner, victim) = pair_mut(cells, owner_idx, victim_idx);
                        if owner.is_alive() {
                            owner.energy += mine_energy_bonus(m.power);
                        }
                        owner.outbox.push(Event::ProjectileHit(ProjectileHitEvent {
                            kind: ProjectileKind::Mine,
                            victim: victim_name,
                            damage,
                            victim_energy,
                        }));
                        !owner.is_teammate(victim)
                            && owner.kind.is_contestant()
                            && victim.kind.is_contestant()
                    } else {
                        false
                    };
                    if scored {
                        scores.projectile_damage(m.owner, cells[victim_idx].id, damage);
                        if victim_killed {
                            scores.kill(m.owner, cells[victim_idx].id, false);
                        }
                    }
                }
                MineState::Exploding | MineState::Inactive => {}
            }
        }
    }

    fn advance_explosions(&mut self) {
        for b in &mut self.bullets {
            if b.state == BulletState::Exploding {
                b.frame += 1;
                if b.frame >= EXPLOSION_FRAMES {
                    b.state = BulletState::Inactive;
                }
            }
        }
        for m in &mut self.mines {
            if m.state == MineState::Exploding {
                m.frame += 1;
                if m.frame >= EXPLOSION_FRAMES {
                    m.state = MineState::Inactive;
                }
            }
        }
        self.bullets.retain(|b| b.state != BulletState::Inactive);
        self.mines.retain(|m| m.state != MineState::Inactive);
    }

    /// Live projectiles for the tick snapshot.
    #[must_use]
    pub fn snapshots(&self) -> (Vec<BulletSnapshot>, Vec<MineSnapshot>) {
        let bullets = self
            .bullets
            .iter()
            .map(|b| BulletSnapshot {
                owner: b.owner,
                position: b.position,
                heading: b.heading,
                power: b.power,
                exploding: b.state == BulletState::Exploding,
            })
            .collect();
        let mines = self
            .mines
            .iter()
            .map(|m| MineSnapshot {
                owner: m.owner,
                position: m.position,
                power: m.power,
                armed: m.state != MineState::Placed,
                exploding: m.state == MineState::Exploding,
            })
            .collect();
        (bullets, mines)
    }
}

fn push_event(cells: &mut [ActorCell], owner: ActorId, event: Event) {
    if let Some(cell) = cells.iter_mut().find(|c| c.id == owner) {
        cell.outbox.push(event);
    }
}

/// Proper segment intersection via orientation tests. Collinear overlaps
/// count as hits.
fn segments_intersect(a1: DVec2, a2: DVec2, b1: DVec2, b2: DVec2) -> bool {
    fn orient(p: DVec2, q: DVec2, r: DVec2) -> f64 {
        (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
    }
    fn on_segment(p: DVec2, q: DVec2, r: DVec2) -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    }
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}
